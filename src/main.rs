use migration::{Migrator, MigratorTrait};
use poem::{listener::TcpListener, Route, Server};
use poem_openapi::OpenApiService;
use sea_orm::{Database, DatabaseConnection};

use staffhub_backend::api::{
    AccountsApi, DirectoryApi, EmployeesApi, EventsApi, HealthApi, MessagesApi,
};
use staffhub_backend::app_data::AppData;
use staffhub_backend::config::{init_logging, AppConfig};
use staffhub_backend::services::{
    AccountService, EmployeeForm, EventForm, PasswordResetService,
};

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_logging().expect("Failed to initialize logging");

    let config = AppConfig::from_env().expect("Failed to load configuration");

    // Connect to database and bring the schema up to date
    let db: DatabaseConnection = Database::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!(database_url = %config.database_url, "Connected to database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    tracing::info!("Database migrations completed");

    let app_data = AppData::init(db, &config);

    let event_form = EventForm::new(
        app_data.employees.clone(),
        app_data.places.clone(),
        app_data.modules.clone(),
        app_data.events.clone(),
    );
    let employee_form = EmployeeForm::new(app_data.employees.clone(), app_data.departments.clone());
    let account_service = AccountService::new(app_data.users.clone());
    let reset_service = PasswordResetService::new(
        app_data.users.clone(),
        app_data.reset_sessions.clone(),
        app_data.tokens.clone(),
    );

    let api_service = OpenApiService::new(
        (
            HealthApi,
            DirectoryApi::new(
                app_data.departments.clone(),
                app_data.places.clone(),
                app_data.modules.clone(),
                app_data.tokens.clone(),
            ),
            EmployeesApi::new(employee_form, app_data.employees.clone(), app_data.tokens.clone()),
            EventsApi::new(event_form, app_data.events.clone(), app_data.tokens.clone()),
            AccountsApi::new(
                account_service,
                app_data.users.clone(),
                reset_service,
                app_data.tokens.clone(),
            ),
            MessagesApi::new(
                app_data.messages.clone(),
                app_data.users.clone(),
                app_data.tokens.clone(),
            ),
        ),
        "StaffHub API",
        "1.0.0",
    )
    .server(format!("http://{}/api", config.bind_addr));

    let ui = api_service.swagger_ui();

    let app = Route::new().nest("/api", api_service).nest("/swagger", ui);

    tracing::info!(bind_addr = %config.bind_addr, "Starting server");

    Server::new(TcpListener::bind(config.bind_addr)).run(app).await
}
