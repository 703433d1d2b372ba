/// Rendering used for exact last-seen times: "05/03/2024, 14:07"
pub(crate) const LAST_SEEN_FORMAT: &str = "%d/%m/%Y, %H:%M";

/// Same instant, made safe for a file name: "05-03-2024_14-07"
pub(crate) const LAST_SEEN_FILE_FORMAT: &str = "%d-%m-%Y_%H-%M";

/// Prefix written before every username in a result file
pub(crate) const HANDLE_MARKER: char = '@';

/// Settings file looked up in the working directory when no --config is given
pub(crate) const DEFAULT_CONFIG_FILE: &str = "config.toml";

pub(crate) const APP_NAME: &str = "presence-sort";
