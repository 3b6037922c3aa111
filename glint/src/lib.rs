pub mod buffer;
pub mod context;
mod error;
#[cfg(feature = "binary")]
pub mod glfw;
pub mod glsl;
pub mod memory;
pub mod program;
pub mod shader;
pub mod vertex;

pub use error::{GlError, GlErrorGuard, QueryError, QueryResult};

pub use gl;

/// Declares a `#[repr(u32)]` enum whose discriminants are GL constants,
/// with raw-value conversions both ways and a human-readable label.
#[macro_export]
macro_rules! gl_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $gl:path => $label:literal ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(u32)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant = $gl, )*
        }

        impl $name {
            pub const fn to_u32(self) -> u32 {
                self as u32
            }

            pub fn from_raw(raw: u32) -> Option<Self> {
                match raw {
                    $( $gl => Some(Self::$variant), )*
                    _ => None,
                }
            }

            pub const fn label(self) -> &'static str {
                match self {
                    $( Self::$variant => $label, )*
                }
            }
        }

        impl From<$name> for u32 {
            fn from(value: $name) -> Self {
                value.to_u32()
            }
        }
    };
}

#[macro_export]
macro_rules! has_handle {
    ($name: ident) => {
        impl $name {
            pub fn as_handle(&self) -> GLuint {
                self.handle
            }
        }
    };
}
