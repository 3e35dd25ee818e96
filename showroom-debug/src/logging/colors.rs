#[cfg(feature = "plain")]
mod color_codes {
    pub const GREEN: &str = "";
    pub const RED: &str = "";
    pub const CYAN: &str = "";
    pub const YELLOW: &str = "";
    pub const MAGENTA: &str = "";
    pub const NONE: &str = "";
}

#[cfg(not(feature = "plain"))]
mod color_codes {
    pub const GREEN: &str = "\x1B[32m";
    pub const RED: &str = "\x1B[31m";
    pub const CYAN: &str = "\x1B[36m";
    pub const YELLOW: &str = "\x1B[33m";
    pub const MAGENTA: &str = "\x1B[35m";
    pub const NONE: &str = "\x1B[0m";
}

use std::fmt::{Debug, Display};

use self::color_codes::*;

/// Wrapper struct to print anything that implements [`Display`] or [`Debug`]
/// in color.
pub struct Colorized<'a, T: ?Sized> {
    wrapped: &'a T,
    color: &'static str,
}

impl<T> Display for Colorized<'_, T>
where
    T: Display + ?Sized,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.color, self.wrapped, NONE)
    }
}

impl<T> Debug for Colorized<'_, T>
where
    T: Debug + ?Sized,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{:?}{}", self.color, self.wrapped, NONE)
    }
}

/// Wrap any type in a [`Colorized`].
pub trait Colorize {
    fn green(&self) -> Colorized<'_, Self> {
        self.colorized(GREEN)
    }

    fn red(&self) -> Colorized<'_, Self> {
        self.colorized(RED)
    }

    fn cyan(&self) -> Colorized<'_, Self> {
        self.colorized(CYAN)
    }

    fn yellow(&self) -> Colorized<'_, Self> {
        self.colorized(YELLOW)
    }

    fn magenta(&self) -> Colorized<'_, Self> {
        self.colorized(MAGENTA)
    }

    #[doc(hidden)]
    fn colorized(&self, color: &'static str) -> Colorized<'_, Self> {
        Colorized { wrapped: self, color }
    }
}

impl<T: ?Sized> Colorize for T {}
