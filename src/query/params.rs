//! Query parameters.

use std::time::Duration;

use crate::uri::DEFAULT_MAX_OIDS;
use crate::version::Version;

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(200);

/// Default number of resends after a timeout.
pub const DEFAULT_RETRIES: u32 = 3;

/// Default GETBULK non-repeaters.
pub const DEFAULT_NON_REPEATERS: u32 = 1;

/// Default GETBULK max-repetitions.
pub const DEFAULT_MAX_REPETITIONS: u32 = 100;

/// Default number of OIDs sent per GET/GETNEXT request.
pub const DEFAULT_OIDS_PER_REQUEST: usize = 10;

// Chained setter plus getter for each plain field.
macro_rules! impl_param_methods {
    ($($(#[$doc:meta])* $field:ident / $getter:ident: $ty:ty),* $(,)?) => {
        impl QueryParams {
            $(
                $(#[$doc])*
                pub fn $field(mut self, $field: $ty) -> Self {
                    self.$field = $field;
                    self
                }
            )*
        }

        impl QueryParams {
            $(
                #[doc = concat!("The configured `", stringify!($field), "`.")]
                pub fn $getter(&self) -> $ty {
                    self.$field
                }
            )*
        }
    };
}

/// Everything one query needs: the URI and protocol settings.
///
/// To merge into an existing collection, pass it to
/// [`query_into`](crate::query::query_into).
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use snmp_query::{QueryParams, Version};
///
/// let params = QueryParams::new("snmp://192.0.2.1//1.3.6.1.2.1.1.5.0")
///     .version(Version::V1)
///     .timeout(Duration::from_secs(1))
///     .retries(1);
/// assert_eq!(params.uri(), "snmp://192.0.2.1//1.3.6.1.2.1.1.5.0");
/// ```
#[derive(Debug, Clone)]
pub struct QueryParams {
    uri: String,
    version: Version,
    timeout: Duration,
    retries: u32,
    non_repeaters: u32,
    max_repetitions: u32,
    max_oids: usize,
    oids_per_request: usize,
}

impl QueryParams {
    /// Parameters for `uri` with the default settings.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            version: Version::default(),
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            non_repeaters: DEFAULT_NON_REPEATERS,
            max_repetitions: DEFAULT_MAX_REPETITIONS,
            max_oids: DEFAULT_MAX_OIDS,
            oids_per_request: DEFAULT_OIDS_PER_REQUEST,
        }
    }

    /// The query URI.
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl_param_methods! {
    /// Set the protocol version.
    version / get_version: Version,
    /// Set the per-attempt timeout.
    timeout / get_timeout: Duration,
    /// Set the number of resends after a timeout.
    retries / get_retries: u32,
    /// Set GETBULK non-repeaters. Walks always send zero, since each root is
    /// walked on its own.
    non_repeaters / get_non_repeaters: u32,
    /// Set GETBULK max-repetitions used by v2c walks.
    max_repetitions / get_max_repetitions: u32,
    /// Set the maximum number of OIDs accepted in the URI.
    max_oids / get_max_oids: usize,
    /// Set how many OIDs go into one GET or GETNEXT request.
    oids_per_request / get_oids_per_request: usize,
}
