use crate::gl_enum;
use glint_utils::OptExt;
use thiserror::Error;

gl_enum! {
    /// Codes drained from `glGetError`.
    pub enum GlError {
        InvalidEnum = gl::INVALID_ENUM => "GL_INVALID_ENUM",
        InvalidValue = gl::INVALID_VALUE => "GL_INVALID_VALUE",
        InvalidOperation = gl::INVALID_OPERATION => "GL_INVALID_OPERATION",
        InvalidFramebufferOperation = gl::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        OutOfMemory = gl::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        StackUnderflow = gl::STACK_UNDERFLOW => "GL_STACK_UNDERFLOW",
        StackOverflow = gl::STACK_OVERFLOW => "GL_STACK_OVERFLOW",
    }
}

impl GlError {
    pub fn try_get() -> Option<Self> {
        let err_num = unsafe { gl::GetError() };
        if err_num == gl::NO_ERROR {
            return None;
        }
        // glGetError can only return the codes above
        Some(Self::from_raw(err_num).unwrap_unreach())
    }

    /// Empties the context's error queue.
    pub fn drain() {
        while Self::try_get().is_some() {}
    }
}

/// Runs a query with a clean error queue and reports anything it raised.
pub(crate) fn checked<T>(run: impl FnOnce() -> T) -> QueryResult<T> {
    GlError::drain();
    let value = run();
    match GlError::try_get() {
        Some(err) => Err(QueryError::Gl(err)),
        None => Ok(value),
    }
}

pub type QueryResult<T> = Result<T, QueryError>;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("extension {0} is not supported by this context")]
    ExtensionUnsupported(&'static str),
    #[error("the driver returned a null string (is a context current?)")]
    NullString,
    #[error("the driver reported an unrecognized {what} value {raw:#06x}")]
    UnknownEnum { what: &'static str, raw: u32 },
    #[error("no active variable named {0:?}")]
    Inactive(String),
    #[error("object {0} is not a shader program")]
    NotAProgram(u32),
    #[error("no buffer bound to uniform binding point {0}")]
    NoBufferBound(u32),
    #[error("could not parse a version out of {0:?}")]
    MalformedVersion(String),
    #[error("buffer data ran out before the reported layout was read")]
    ShortRead,
    #[error("shader compilation failed:\n{0}")]
    ShaderCompile(String),
    #[error("program link failed:\n{0}")]
    ProgramLink(String),
    #[error("GL error {}", .0.label())]
    Gl(GlError),
}

/// Clears any GL errors on creation, asserts
/// that no GL errors occur in its lifetime.
///
/// Checks for GL errors on `Drop`, and panics
/// if any occured.
pub struct GlErrorGuard {
    name: Option<&'static str>,
}

impl Drop for GlErrorGuard {
    fn drop(&mut self) {
        if let Some(err) = GlError::try_get() {
            match self.name {
                Some(name) => panic!("GL error assert \"{name}\" failed: {err:?}"),
                None => panic!("GL error assert failed: {err:?}"),
            }
        }
    }
}

impl Default for GlErrorGuard {
    fn default() -> Self {
        Self::new_internal(None)
    }
}

impl GlErrorGuard {
    pub fn clear_existing(name: Option<&'static str>) {
        if let Some(err) = GlError::try_get() {
            match name {
                Some(name) => println!("Existing error on guard \"{name}\" creation: {err:?}"),
                None => println!("Existing error on guard creation: {err:?}"),
            }
        }
    }

    fn new_internal(name: Option<&'static str>) -> Self {
        Self::clear_existing(name);
        Self { name }
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: &'static str) -> Self {
        Self::new_internal(Some(name))
    }

    pub fn guarded<T>(run: impl FnOnce() -> T) -> T {
        let guard = Self::new();
        let result = run();
        drop(guard);
        result
    }

    pub fn guard_named<T>(name: &'static str, run: impl FnOnce() -> T) -> T {
        let guard = Self::named(name);
        let result = run();
        drop(guard);
        result
    }
}
