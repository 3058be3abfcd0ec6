// Env values used by the StreamOne client.
pub const STREAMONE_ENDPOINT: &str = "STREAMONE_ENDPOINT";
pub const STREAMONE_AUTHENTICATION_TYPE: &str = "STREAMONE_AUTHENTICATION_TYPE";
pub const STREAMONE_APPLICATION: &str = "STREAMONE_APPLICATION";
pub const STREAMONE_USER: &str = "STREAMONE_USER";
pub const STREAMONE_PSK: &str = "STREAMONE_PSK";
pub const STREAMONE_CUSTOMER: &str = "STREAMONE_CUSTOMER";
pub const STREAMONE_TIMEOUT: &str = "STREAMONE_TIMEOUT";

pub const API_VERSION: &str = "3";
pub const FORMAT_JSON: &str = "json";

// Query parameters, in the order they are sent.
pub const PARAM_API: &str = "api";
pub const PARAM_FORMAT: &str = "format";
pub const PARAM_AUTHENTICATION_TYPE: &str = "authentication_type";
pub const PARAM_TIMESTAMP: &str = "timestamp";
pub const PARAM_APPLICATION: &str = "application";
pub const PARAM_USER: &str = "user";
pub const PARAM_CUSTOMER: &str = "customer";
pub const PARAM_SESSION: &str = "session";
pub const PARAM_SIGNATURE: &str = "signature";

pub const WIRE_ORDER: [&str; 8] = [
    PARAM_API,
    PARAM_FORMAT,
    PARAM_AUTHENTICATION_TYPE,
    PARAM_TIMESTAMP,
    PARAM_APPLICATION,
    PARAM_USER,
    PARAM_CUSTOMER,
    PARAM_SESSION,
];
