//! Credential backends
//!
//! Every way the app can authenticate a user sits behind
//! [`CredentialBackend`]; the session manager only talks to the trait.

pub mod desktop;
pub mod factory;
pub mod local;
pub mod mock;
pub mod remote;
pub mod traits;

pub use desktop::DesktopBackend;
pub use factory::create_backend;
pub use local::LocalBackend;
pub use mock::MockBackend;
pub use remote::RemoteBackend;
pub use traits::*;
