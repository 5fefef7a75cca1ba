// Services layer - Business logic and orchestration
pub mod account_service;
pub mod crypto;
pub mod employee_form;
pub mod event_form;
pub mod password_reset;
pub mod resolver;
pub mod schedule;
pub mod token_service;

pub use account_service::AccountService;
pub use employee_form::{EmployeeForm, EmployeeSubmission};
pub use event_form::{EventForm, EventSubmission};
pub use password_reset::{
    AnswerOutcome, PasswordResetService, ResetError, ResetState, SECURITY_QUESTION_1,
    SECURITY_QUESTION_2,
};
pub use resolver::Resolution;
pub use schedule::ScheduleConflictChecker;
pub use token_service::{TokenError, TokenService};
