//! Internal logging helpers for structured coldb events.

/// Single logging target for coldb.
pub(crate) const LOG_TARGET: &str = "coldb";

/// Optional common key/value fields appended to all logs in a scope.
#[derive(Clone, Debug)]
pub(crate) struct LogContext {
    common_kv: String,
}

impl LogContext {
    /// Build a context scoped to a single table.
    pub(crate) fn for_table(table: &str) -> Self {
        Self {
            common_kv: format!("table={table}"),
        }
    }

    pub(crate) fn common_kv(&self) -> Option<&str> {
        if self.common_kv.is_empty() {
            None
        } else {
            Some(self.common_kv.as_str())
        }
    }
}

macro_rules! coldb_log {
    ($level:expr, $event:expr, $fmt:expr $(, $args:expr)* $(,)?) => {{
        if log::log_enabled!(target: crate::logging::LOG_TARGET, $level) {
            log::log!(
                target: crate::logging::LOG_TARGET,
                $level,
                "event={} {}",
                $event,
                format_args!($fmt $(, $args)*)
            );
        }
    }};
    ($level:expr, ctx: $ctx:expr, $event:expr, $fmt:expr $(, $args:expr)* $(,)?) => {{
        if log::log_enabled!(target: crate::logging::LOG_TARGET, $level) {
            if let Some(common_kv) = $ctx.common_kv() {
                log::log!(
                    target: crate::logging::LOG_TARGET,
                    $level,
                    "event={} {} {}",
                    $event,
                    common_kv,
                    format_args!($fmt $(, $args)*)
                );
            } else {
                log::log!(
                    target: crate::logging::LOG_TARGET,
                    $level,
                    "event={} {}",
                    $event,
                    format_args!($fmt $(, $args)*)
                );
            }
        }
    }};
}

pub(crate) use coldb_log;
