/// Backend endpoint paths, relative to the configured base URL.
pub const FIND_GROUPS_PATH: &str = "sortgroupsbyudise";
pub const SYNC_GROUPS_PATH: &str = "syncallgroups";
pub const GROUP_COUNT_PATH: &str = "getgroupsbyudisecount";
pub const ADD_NUMBER_PATH: &str = "addnumbertogroups";
pub const ADDITION_STATUS_PATH: &str = "getnumberadditionstatus";
pub const DEFAULT_UNMATCHED_GROUPS_PATH: &str = "getunmatchedgroups";

/// Message template and media endpoints. `{type}` and `{name}` segments are filled per call.
pub const DEFAULT_TEMPLATES_PATH: &str = "getAllMessageTemplates";
pub const DEFAULT_CREATE_TEMPLATE_PATH: &str = "createMessageTemplate";
pub const DEFAULT_UPDATE_TEMPLATE_PATH: &str = "updateMessageTemplate";
pub const DEFAULT_DELETE_TEMPLATE_PATH: &str = "deleteMessageTemplate";
pub const DEFAULT_MEDIA_LIST_PATH: &str = "getAllMediaByType/{type}/students/whatsapp_osepa";
pub const DEFAULT_MEDIA_UPLOAD_PATH: &str = "saveMedia/{type}";
pub const DEFAULT_MEDIA_USAGE_PATH: &str = "checkMediaAvailability/{name}";
pub const DEFAULT_MEDIA_DELETE_PATH: &str = "deleteMedia";
pub const DEFAULT_APP_TYPE: &str = "whatsapp_osepa";
pub const MEDIA_CONSUMER_TYPE: &str = "students";
pub const DEFAULT_MEDIA_TYPE: &str = "image";

/// Upper bound on a single template message.
pub const MAX_MESSAGE_CHARS: usize = 1000;
/// Image formats the messaging provider accepts.
pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpeg", "jpg"];

/// Column-name fragments that mark the school identifier column.
/// "udice" is a misspelling that shows up in district-supplied sheets.
pub const IDENTIFIER_COLUMN_TOKENS: [&str; 2] = ["udise", "udice"];

/// Header used when showing the identifier preview.
pub const PREVIEW_COLUMN_HEADER: &str = "UDISE Code";

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Prefix prepended to ten-digit mobile numbers before they are sent.
pub const COUNTRY_CODE: &str = "91";

pub const DEFAULT_EXPORT_FILE: &str = "unmatched_groups.xlsx";
pub const EXPORT_SHEET_NAME: &str = "Unmatched Groups";
pub const MISSING_NAME: &str = "N/A";
