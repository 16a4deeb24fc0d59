use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use rand::Rng;
use tokio::process::Command;
use tracing::{error, info};

use crate::config::ProvisioningConfig;
use crate::constants::provisioning::{KEY_FILE_PREFIX, MAX_FILENAME_ATTEMPTS};

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("email address has no local part")]
    InvalidEmail,

    #[error("'{0}' is not a usable account name")]
    InvalidAccount(String),

    #[error("system account '{0}' does not exist")]
    UnknownAccount(String),

    #[error("no free key filename for account '{0}'")]
    FilenameExhausted(String),

    #[error("failed to launch {0}: {1}")]
    Spawn(String, #[source] std::io::Error),

    #[error("key generation failed")]
    Keygen,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result of a successful provisioning run. The private key stays on the
/// server filesystem; callers only ever see the public half and an opaque
/// handle naming the generated pair.
#[derive(Debug, Clone)]
pub struct ProvisionedKey {
    pub key_id: String,
    pub public_key: String,
}

/// Generates SSH keypairs for local system accounts by shelling out to
/// ssh-keygen.
#[derive(Clone)]
pub struct ProvisioningService {
    config: ProvisioningConfig,
}

impl ProvisioningService {
    #[must_use]
    pub const fn new(config: ProvisioningConfig) -> Self {
        Self { config }
    }

    /// Generate an RSA keypair for the account derived from `email`.
    ///
    /// The account's `.ssh` directory is created at 0700 if missing; the
    /// private key ends up 0600, the public key 0644.
    pub async fn generate_keypair(&self, email: &str) -> Result<ProvisionedKey, ProvisionError> {
        let account = derive_account(email)?;

        let home = Path::new(&self.config.home_root).join(&account);
        if !home.is_dir() {
            return Err(ProvisionError::UnknownAccount(account));
        }

        let ssh_dir = home.join(".ssh");
        tokio::fs::create_dir_all(&ssh_dir).await?;
        tokio::fs::set_permissions(&ssh_dir, std::fs::Permissions::from_mode(0o700)).await?;

        let (key_id, private_path) = pick_key_filename(&ssh_dir, &account)?;
        let public_path = ssh_dir.join(format!("{key_id}.pub"));

        self.run_keygen(email, &private_path).await?;

        tokio::fs::set_permissions(&private_path, std::fs::Permissions::from_mode(0o600)).await?;
        tokio::fs::set_permissions(&public_path, std::fs::Permissions::from_mode(0o644)).await?;

        let public_key = tokio::fs::read_to_string(&public_path).await?;

        info!(account = %account, key_id = %key_id, "SSH keypair provisioned");

        Ok(ProvisionedKey {
            key_id,
            public_key: public_key.trim_end().to_string(),
        })
    }

    async fn run_keygen(&self, email: &str, private_path: &Path) -> Result<(), ProvisionError> {
        let keygen = &self.config.ssh_keygen_path;

        let output = Command::new(keygen)
            .arg("-t")
            .arg("rsa")
            .arg("-b")
            .arg(self.config.key_bits.to_string())
            .arg("-q")
            .arg("-N")
            .arg("")
            .arg("-C")
            .arg(email)
            .arg("-f")
            .arg(private_path)
            .output()
            .await
            .map_err(|e| ProvisionError::Spawn(keygen.clone(), e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // Keep subprocess detail in the server log only.
            error!(status = %output.status, stderr = %stderr.trim(), "ssh-keygen failed");
            return Err(ProvisionError::Keygen);
        }

        Ok(())
    }
}

/// Derive the local account name from the part of `email` before '@'.
fn derive_account(email: &str) -> Result<String, ProvisionError> {
    let account = email
        .split_once('@')
        .map(|(local, _)| local)
        .ok_or(ProvisionError::InvalidEmail)?;

    if account.is_empty() {
        return Err(ProvisionError::InvalidEmail);
    }

    // Account names become path components below home_root.
    let valid = account
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_');
    if !valid || account.starts_with('.') {
        return Err(ProvisionError::InvalidAccount(account.to_string()));
    }

    Ok(account.to_string())
}

/// Pick an unused key filename, disambiguated by a random 6-digit suffix.
fn pick_key_filename(ssh_dir: &Path, account: &str) -> Result<(String, PathBuf), ProvisionError> {
    let mut rng = rand::rng();

    for _ in 0..MAX_FILENAME_ATTEMPTS {
        let suffix: u32 = rng.random_range(100_000..=999_999);
        let key_id = format!("{KEY_FILE_PREFIX}_{suffix}");
        let private_path = ssh_dir.join(&key_id);
        let public_path = ssh_dir.join(format!("{key_id}.pub"));

        if !private_path.exists() && !public_path.exists() {
            return Ok((key_id, private_path));
        }
    }

    Err(ProvisionError::FilenameExhausted(account.to_string()))
}
