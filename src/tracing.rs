#[cfg(feature = "tracing")]
mod defs {
    pub use tracing::Level;
    pub use tracing::{event, span};
}

#[cfg(not(feature = "tracing"))]
#[allow(dead_code)]
mod defs {
    pub enum Level {
        ERROR,
        WARN,
        INFO,
        DEBUG,
        TRACE,
    }

    pub struct Span {}

    impl Span {
        pub const fn entered(&self) -> Self {
            Self {}
        }
    }

    macro_rules! span {
        ($($any:tt)*) => {{
            use crate::tracing::Span;
            Span {}
        }};
    }

    /// Formats nothing, but still borrows every argument.
    macro_rules! event {
        ($level:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
            let _ = format_args!($fmt $(, $arg)*);
        }};
        ($level:expr, $($field:ident = $value:expr),+ , $fmt:literal $(, $arg:expr)* $(,)?) => {{
            let _ = ($(&$value,)+);
            let _ = format_args!($fmt $(, $arg)*);
        }};
    }

    pub(crate) use {event, span};
}

pub(crate) use defs::*;
