//! The external Cloud Provider Interface.
//!
//! The director never talks to an IaaS directly. Each provider ships an
//! executable that accepts one JSON request on stdin and answers with one
//! JSON response on stdout:
//!
//! - [`CpiMethod`] / [`CpiCall`]: the closed set of operations
//! - [`CpiRequest`] / [`CpiResponse`]: the wire documents
//! - [`CloudErrorKind`]: error types a provider may declare
//! - [`CpiTransport`]: the seam, implemented by [`ExternalCpi`] and [`FakeCpi`]
//! - [`ExternalCpiResponseWrapper`]: hides API version differences

pub mod errors;
pub mod external;
pub mod method;
pub mod protocol;
pub mod redact;
pub mod transport;
pub mod wrapper;

pub use errors::CloudErrorKind;
pub use external::{ExternalCpi, PROVIDER_PATH};
pub use method::{CpiCall, CpiMethod};
pub use protocol::{CpiErrorPayload, CpiRequest, CpiResponse, RequestContext, REDACTED};
pub use redact::redact_arguments;
pub use transport::{CpiTransport, FakeCpi, RecordedCall};
pub use wrapper::{CreateVmResponse, ExternalCpiResponseWrapper, MAX_KNOWN_API_VERSION};
