//! Application constants for text2flat
//!
//! This module contains the detection patterns, default values and the
//! Symphony flat-file schema tables used throughout the converter.

// =============================================================================
// Input Defaults
// =============================================================================

/// Default column delimiter for input files
pub const DEFAULT_DELIMITER: &str = ",";

/// Delimiter value that asks the reader to sniff the delimiter from the input
pub const AUTO_DELIMITER: &str = "auto";

/// Candidate delimiters considered when sniffing
pub const DELIMITER_CANDIDATES: &[char] = &[',', '|', '\t', ';'];

/// Number of leading lines sampled when sniffing a delimiter
pub const DELIMITER_SAMPLE_LINES: usize = 10;

/// Default well-formedness threshold (percentage of records)
pub const DEFAULT_THRESHOLD: f64 = 90.0;

/// Directory name under the user's configuration directory
pub const CONFIG_DIR_NAME: &str = "text2flat";

/// Configuration file name looked up when no explicit path is given
pub const CONFIG_FILE_NAME: &str = "config.json";

// =============================================================================
// Date Classification
// =============================================================================

/// Date classification limits and sentinels
pub mod dates {
    /// Expiry sentinel meaning the account never expires
    pub const NEVER_EXPIRES: &str = "NEVER";

    /// Oldest plausible birth date, in years before today
    pub const BIRTH_MAX_AGE_YEARS: u32 = 100;

    /// Most recent plausible birth date, in years before today
    pub const BIRTH_MIN_AGE_YEARS: u32 = 2;

    /// Expiry dates must fall strictly after today plus this many days
    pub const EXPIRY_MIN_DAYS_AHEAD: u64 = 1;

    /// Canonical output format (ANSI date)
    pub const CANONICAL_FORMAT: &str = "%Y%m%d";

    /// year-month-day, separators optional, may be followed by a time suffix
    pub const YEAR_MONTH_DAY: &str =
        r"^(19|20)\d\d[-/]?(0[1-9]|1[0-2])[-/]?(0[1-9]|[12]\d|3[01])(?:$|[\sT])";

    /// day-month-year, only when the leading component cannot be a month
    pub const DAY_MONTH_YEAR: &str =
        r"^(1[3-9]|2\d|3[01])[-/]?(0[1-9]|1[0-2])[-/]?(19|20)\d\d(?:$|[\sT])";

    /// month-day-year
    pub const MONTH_DAY_YEAR: &str =
        r"^(0[1-9]|1[0-2])[-/]?(0[1-9]|[12]\d|3[01])[-/]?(19|20)\d\d(?:$|[\sT])";
}

// =============================================================================
// Field Detection Patterns
// =============================================================================

/// Regular expressions for pattern-detected fields
pub mod patterns {
    pub const USER_ID: &str = r"^\d{6,15}$";
    pub const EMAIL: &str = r"^(\w|\.|_|-)+@(\w|_|-|\.)+\.\w{2,3}$";
    pub const POSTAL_CODE: &str = r"^[a-zA-Z]\d[a-zA-Z](\s+)?\d[a-zA-Z]\d$";
    pub const COUNTRY: &str = r"^(CA|Canada)";
    pub const PROVINCE: &str = r"^(NL|PE|NS|NB|QC|ON|MB|SK|AB|BC|YT|NT|NU)";
    pub const PHONE: &str = r"^(\+)?(\()?\d{3}(-| |\)(\s|-)?)?\d{3}(-| )?\d{4}$";
    pub const GENDER: &str = r"^((M|m)(ale)?|(F|f)(emale)?|(P|p)refer\s+not\s+to\s+say|(N|n)(ot\s+listed)?|(X|x))$";
}

// =============================================================================
// Symphony Flat File Schema
// =============================================================================

/// Symphony flat user format: tags, defaults, bindings and blocks
pub mod symphony {
    /// First line of every flat record
    pub const DOCUMENT_BOUNDARY: &str = "*** DOCUMENT BOUNDARY ***";

    /// Default form identifier for user loads
    pub const DEFAULT_FORM_ID: &str = "LDUSER";

    /// Separator between a tag and its value
    pub const VALUE_SEPARATOR: &str = "   |a";

    /// System field name to flat tag
    pub const TAGS: &[(&str, &str)] = &[
        ("userId", "USER_ID"),
        ("userGroupId", "USER_GROUP_ID"),
        ("userName", "USER_NAME"),
        ("userFirstName", "USER_FIRST_NAME"),
        ("userLastName", "USER_LAST_NAME"),
        ("userPreferredName", "USER_PREFERRED_NAME"),
        ("userNameDspPref", "USER_NAME_DSP_PREF"),
        ("userLibrary", "USER_LIBRARY"),
        ("userProfile", "USER_PROFILE"),
        ("userPrefLang", "USER_PREF_LANG"),
        ("userPin", "USER_PIN"),
        ("userStatus", "USER_STATUS"),
        ("userRoutingFlag", "USER_ROUTING_FLAG"),
        ("userChgHistRule", "USER_CHG_HIST_RULE"),
        ("userLastActivity", "USER_LAST_ACTIVITY"),
        ("userPrivGranted", "USER_PRIV_GRANTED"),
        ("userPrivExpires", "USER_PRIV_EXPIRES"),
        ("userBirthDate", "USER_BIRTH_DATE"),
        ("userCategory1", "USER_CATEGORY1"),
        ("userCategory2", "USER_CATEGORY2"),
        ("userCategory3", "USER_CATEGORY3"),
        ("userCategory4", "USER_CATEGORY4"),
        ("userCategory5", "USER_CATEGORY5"),
        ("userAccess", "USER_ACCESS"),
        ("userEnvironment", "USER_ENVIRONMENT"),
        ("userMailingaddr", "USER_MAILINGADDR"),
        ("street", "STREET"),
        ("citySlashState", "CITY/STATE"),
        ("cityProv", "CITYPROV"),
        ("citySlashProv", "CITY/PROV"),
        ("postalcode", "POSTALCODE"),
        ("phone", "PHONE"),
        ("phone1", "PHONE1"),
        ("email", "EMAIL"),
        ("notifyVia", "NOTIFY_VIA"),
        ("note", "NOTE"),
        ("retrnmail", "RETRNMAIL"),
        ("homephone", "HOMEPHONE"),
    ];

    /// Default values applied when a record does not supply the system field
    pub const DEFAULTS: &[(&str, &str)] = &[
        ("userNameDspPref", "0"),
        ("userPrefLang", "ENGLISH"),
        ("userRoutingFlag", "Y"),
        ("userChgHistRule", "ALLCHARGES"),
        ("userAccess", "PUBLIC"),
        ("userEnvironment", "PUBLIC"),
        ("userMailingaddr", "1"),
        ("notifyVia", "PHONE"),
        ("retrnmail", "YES"),
    ];

    /// Record label to system field
    pub const OUTPUT_BINDINGS: &[(&str, &str)] = &[
        ("firstName", "userFirstName"),
        ("lastName", "userLastName"),
        ("birthday", "userBirthDate"),
        ("gender", "userCategory2"),
        ("email", "email"),
        ("phone", "phone"),
        ("street", "street"),
        ("city", "citySlashProv"),
        ("province", "cityProv"),
        ("postalcode", "postalcode"),
        ("userId", "userId"),
        ("barcode", "userId"),
        ("pin", "userPin"),
        ("profile", "userProfile"),
        ("type", "userProfile"),
        ("expiry", "userPrivExpires"),
        ("branch", "userLibrary"),
        ("status", "userStatus"),
        ("notes", "note"),
    ];

    /// System fields holding dates, rewritten to the canonical format on output
    pub const DATE_FIELDS: &[&str] = &[
        "userBirthDate",
        "userPrivExpires",
        "userPrivGranted",
        "userLastActivity",
    ];

    /// Primary address block tag prefix
    pub const ADDRESS_BLOCK: &str = "USER_ADDR1_";

    /// Extended information block tag prefix
    pub const XINFO_BLOCK: &str = "USER_XINFO_";

    /// Blocks in emission order
    pub const BLOCKS: &[&str] = &[ADDRESS_BLOCK, XINFO_BLOCK];

    /// System field to the block it must be written inside
    pub const BLOCK_MEMBERS: &[(&str, &str)] = &[
        ("postalcode", ADDRESS_BLOCK),
        ("phone", ADDRESS_BLOCK),
        ("street", ADDRESS_BLOCK),
        ("citySlashProv", ADDRESS_BLOCK),
        ("email", ADDRESS_BLOCK),
        ("note", XINFO_BLOCK),
    ];
}

// =============================================================================
// Logging
// =============================================================================

/// Default log level when none is requested
pub const DEFAULT_LOG_LEVEL: &str = "warn";
