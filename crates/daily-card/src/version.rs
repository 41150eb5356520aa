use const_format::formatcp;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_SHA: &str = env!("VERGEN_GIT_SHA");
pub const BUILD_DATE: &str = env!("VERGEN_BUILD_DATE");
pub const TARGET_TRIPLE: &str = env!("VERGEN_CARGO_TARGET_TRIPLE");

/// clap の `--version` に表示する文字列。
pub const SHORT_VERSION: &str = formatcp!("{VERSION} ({GIT_SHA} {BUILD_DATE})");

/// 外部 API に送る User-Agent。
pub const USER_AGENT: &str = formatcp!("daily-card/{VERSION}");
