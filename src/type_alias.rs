/// WMStats result type, an alias of [anyhow::Result]
pub type WMStatsResult<T> = anyhow::Result<T>;

/// WMStats error type, an alias of [anyhow::Error]
pub type WMStatsError = anyhow::Error;
