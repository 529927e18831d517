pub const PATH_STATUS: &str = "/status";
pub const PATH_CONFIG: &str = "/config";
pub const PATH_TEMPERATURE: &str = "/temperature";
pub const PATH_ON: &str = "/on";
pub const PATH_OFF: &str = "/off";
