// Privacy request module - filing, confirming and storing data subject requests
//
// Collaborators (store, clock, hasher) are injected so the workflows can be
// driven deterministically in tests.

pub mod clock;
pub mod confirm;
pub mod email;
pub mod errors;
pub mod form;
pub mod intake;
pub mod state_machine;
pub mod store;
pub mod token;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use confirm::{confirm_token_ttl, ConfirmationWorkflow, CONFIRM_TOKEN_TTL_HOURS};
pub use email::email_to_punycode;
pub use errors::{ConfirmError, IntakeError, StoreError, TokenError};
pub use form::{load_form, parse_query, FieldError, Form, FormIntent, HttpMethod};
pub use intake::{IssuedRequest, RequestIntake};
pub use state_machine::{RequestEvent, StatusTransition, TransitionError};
pub use store::{InMemoryRequestStore, JsonFileRequestStore, RequestFilter, RequestStore};
#[cfg(feature = "database")]
pub use store::SqliteRequestStore;
pub use token::{generate_token, HashingConfig, TokenHasher};
pub use types::{ConfirmInput, PrivacyRequest, RequestStatus, RequestType};
