pub const TOKEN: &str = "TELOXIDE_TOKEN";
pub const BOT_NAME: &str = "BOT_NAME";
pub const DATABASE_URL: &str = "DATABASE_URL";
pub const HANDLER_PORT: &str = "FUNCTIONS_CUSTOMHANDLER_PORT";
pub const QUEUE_OWNER: &str = "QUEUE_OWNER";

pub const DEFAULT_HANDLER_PORT: u16 = 3000;
pub const DEFAULT_OWNER: &str = "Jiklopo";
