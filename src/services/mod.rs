pub mod credentials;
pub mod provisioning;

pub use credentials::CredentialService;
pub use provisioning::{ProvisionError, ProvisionedKey, ProvisioningService};
