//! General context information: vendor strings, versions, profile,
//! extension set.

use std::ffi::CStr;
use std::fmt;

use crate::error::{checked, QueryError, QueryResult};
use crate::gl_enum;
use gl::types::*;

gl_enum! {
    pub enum GlString {
        Vendor = gl::VENDOR => "GL_VENDOR",
        Renderer = gl::RENDERER => "GL_RENDERER",
        Version = gl::VERSION => "GL_VERSION",
        ShadingLanguageVersion = gl::SHADING_LANGUAGE_VERSION => "GL_SHADING_LANGUAGE_VERSION",
    }
}

impl GlString {
    pub fn get(self) -> QueryResult<String> {
        let str_ptr = checked(|| unsafe { gl::GetString(self.to_u32()) })?;
        if str_ptr.is_null() {
            return Err(QueryError::NullString);
        }
        let c_str = unsafe { CStr::from_ptr(str_ptr.cast()) };
        Ok(c_str.to_string_lossy().into_owned())
    }
}

pub fn vendor() -> QueryResult<String> {
    GlString::Vendor.get()
}

pub fn renderer() -> QueryResult<String> {
    GlString::Renderer.get()
}

pub fn version() -> QueryResult<String> {
    GlString::Version.get()
}

pub fn glsl_version() -> QueryResult<String> {
    GlString::ShadingLanguageVersion.get()
}

pub(crate) fn get_integer(pname: GLenum) -> QueryResult<GLint> {
    checked(|| {
        let mut value = 0;
        unsafe { gl::GetIntegerv(pname, &mut value) };
        value
    })
}

pub(crate) fn get_indexed_integer(pname: GLenum, index: GLuint) -> QueryResult<GLint> {
    checked(|| {
        let mut value = 0;
        unsafe { gl::GetIntegeri_v(pname, index, &mut value) };
        value
    })
}

pub fn major_version() -> QueryResult<GLint> {
    get_integer(gl::MAJOR_VERSION)
}

pub fn minor_version() -> QueryResult<GLint> {
    get_integer(gl::MINOR_VERSION)
}

/// Pulls `major.minor` out of a reported version string, skipping any
/// vendor prefix and ignoring everything after the minor number
/// (e.g. `"4.6.0 NVIDIA 535.171.04"` is `(4, 6)`).
pub fn parse_version(reported: &str) -> QueryResult<(u32, u32)> {
    let malformed = || QueryError::MalformedVersion(reported.to_owned());
    let start = reported
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(malformed)?;

    let mut parts = reported[start..].split(|c: char| !c.is_ascii_digit());
    let major = parts.next().and_then(|part| part.parse().ok());
    let minor = parts.next().and_then(|part| part.parse().ok());
    match (major, minor) {
        (Some(major), Some(minor)) => Ok((major, minor)),
        _ => Err(malformed()),
    }
}

pub fn version_pair() -> QueryResult<(u32, u32)> {
    parse_version(&version()?)
}

pub fn glsl_version_pair() -> QueryResult<(u32, u32)> {
    parse_version(&glsl_version()?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Core,
    Compatibility,
}

impl Profile {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Compatibility => "compatibility",
        }
    }
}

pub fn profile() -> QueryResult<Profile> {
    let mask = get_integer(gl::CONTEXT_PROFILE_MASK)? as u32;
    if mask & gl::CONTEXT_CORE_PROFILE_BIT != 0 {
        Ok(Profile::Core)
    } else if mask & gl::CONTEXT_COMPATIBILITY_PROFILE_BIT != 0 {
        Ok(Profile::Compatibility)
    } else {
        Err(QueryError::UnknownEnum {
            what: "context profile mask",
            raw: mask,
        })
    }
}

pub fn extensions() -> QueryResult<Vec<String>> {
    let count = get_integer(gl::NUM_EXTENSIONS)?;
    (0..count as GLuint)
        .map(|i| {
            let str_ptr = checked(|| unsafe { gl::GetStringi(gl::EXTENSIONS, i) })?;
            if str_ptr.is_null() {
                return Err(QueryError::NullString);
            }
            let c_str = unsafe { CStr::from_ptr(str_ptr.cast()) };
            Ok(c_str.to_string_lossy().into_owned())
        })
        .collect()
}

pub fn is_supported(name: &str) -> QueryResult<bool> {
    Ok(extensions()?.iter().any(|ext| ext == name))
}

/// Everything worth printing about the current context in one gather.
#[derive(Debug, Clone)]
pub struct ContextInfo {
    pub vendor: String,
    pub renderer: String,
    pub version: String,
    pub glsl_version: String,
    pub major: GLint,
    pub minor: GLint,
    pub profile: Profile,
    pub extension_count: usize,
}

impl ContextInfo {
    pub fn gather() -> QueryResult<Self> {
        Ok(Self {
            vendor: vendor()?,
            renderer: renderer()?,
            version: version()?,
            glsl_version: glsl_version()?,
            major: major_version()?,
            minor: minor_version()?,
            profile: profile()?,
            extension_count: extensions()?.len(),
        })
    }
}

impl fmt::Display for ContextInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "vendor:       {}", self.vendor)?;
        writeln!(f, "renderer:     {}", self.renderer)?;
        writeln!(
            f,
            "version:      {} ({}.{} {})",
            self.version,
            self.major,
            self.minor,
            self.profile.label()
        )?;
        writeln!(f, "glsl version: {}", self.glsl_version)?;
        write!(f, "extensions:   {}", self.extension_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_with_vendor_suffix() {
        assert_eq!(parse_version("4.6.0 NVIDIA 535.171.04").unwrap(), (4, 6));
    }

    #[test]
    fn version_with_prefix() {
        assert_eq!(parse_version("OpenGL ES 3.2 Mesa 23.0").unwrap(), (3, 2));
    }

    #[test]
    fn bare_version() {
        assert_eq!(parse_version("4.10").unwrap(), (4, 10));
    }

    #[test]
    fn version_without_digits() {
        assert!(matches!(
            parse_version("unknown"),
            Err(QueryError::MalformedVersion(_))
        ));
    }

    #[test]
    fn version_without_minor() {
        assert!(parse_version("4").is_err());
    }
}
