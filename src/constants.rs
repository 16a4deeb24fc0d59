pub const API_KEY_HEADER: &str = "API-KEY";

pub mod pin {

    pub const MIN: u32 = 100_000;

    pub const MAX: u32 = 999_999;
}

pub mod provisioning {

    pub const KEY_FILE_PREFIX: &str = "id_rsa";

    /// Attempts to find an unused key filename before giving up.
    pub const MAX_FILENAME_ATTEMPTS: u32 = 16;
}
