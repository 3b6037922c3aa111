//! Buffer objects: a small creation wrapper plus metadata introspection
//! for whatever is bound to the context.

use std::fmt;
use std::mem::size_of_val;

use crate::context;
use crate::error::{checked, QueryError, QueryResult};
use crate::{gl_enum, has_handle};
use gl::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessFrequency {
    /// Modified once, used a few times
    Stream,
    /// Modified once, used many times
    #[default]
    Static,
    /// Modified many times, used many times
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessNature {
    /// Modified by app, used in draw and spec commands
    #[default]
    Draw,
    /// Modified by reading from GL, used to return data to app
    Read,
    /// Modified by reading from GL, used in draw and spec commands
    Copy,
}

/// A `GL_*_DRAW`-family usage hint, split into its two axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DataUsage {
    frequency: AccessFrequency,
    nature: AccessNature,
}

use AccessFrequency as Freq;
use AccessNature as Nat;

impl DataUsage {
    pub const STATIC_DRAW: Self = Self::new(Freq::Static, Nat::Draw);

    pub const fn new(frequency: Freq, nature: Nat) -> Self {
        Self { frequency, nature }
    }

    pub const fn to_u32(self) -> u32 {
        match (self.frequency, self.nature) {
            (Freq::Stream, Nat::Draw) => gl::STREAM_DRAW,
            (Freq::Static, Nat::Draw) => gl::STATIC_DRAW,
            (Freq::Dynamic, Nat::Draw) => gl::DYNAMIC_DRAW,

            (Freq::Stream, Nat::Copy) => gl::STREAM_COPY,
            (Freq::Static, Nat::Copy) => gl::STATIC_COPY,
            (Freq::Dynamic, Nat::Copy) => gl::DYNAMIC_COPY,

            (Freq::Stream, Nat::Read) => gl::STREAM_READ,
            (Freq::Static, Nat::Read) => gl::STATIC_READ,
            (Freq::Dynamic, Nat::Read) => gl::DYNAMIC_READ,
        }
    }

    pub fn from_raw(raw: u32) -> Option<Self> {
        Some(match raw {
            gl::STREAM_DRAW => Self::new(Freq::Stream, Nat::Draw),
            gl::STATIC_DRAW => Self::new(Freq::Static, Nat::Draw),
            gl::DYNAMIC_DRAW => Self::new(Freq::Dynamic, Nat::Draw),

            gl::STREAM_COPY => Self::new(Freq::Stream, Nat::Copy),
            gl::STATIC_COPY => Self::new(Freq::Static, Nat::Copy),
            gl::DYNAMIC_COPY => Self::new(Freq::Dynamic, Nat::Copy),

            gl::STREAM_READ => Self::new(Freq::Stream, Nat::Read),
            gl::STATIC_READ => Self::new(Freq::Static, Nat::Read),
            gl::DYNAMIC_READ => Self::new(Freq::Dynamic, Nat::Read),
            _ => return None,
        })
    }

    pub const fn label(self) -> &'static str {
        match (self.frequency, self.nature) {
            (Freq::Stream, Nat::Draw) => "GL_STREAM_DRAW",
            (Freq::Static, Nat::Draw) => "GL_STATIC_DRAW",
            (Freq::Dynamic, Nat::Draw) => "GL_DYNAMIC_DRAW",

            (Freq::Stream, Nat::Copy) => "GL_STREAM_COPY",
            (Freq::Static, Nat::Copy) => "GL_STATIC_COPY",
            (Freq::Dynamic, Nat::Copy) => "GL_DYNAMIC_COPY",

            (Freq::Stream, Nat::Read) => "GL_STREAM_READ",
            (Freq::Static, Nat::Read) => "GL_STATIC_READ",
            (Freq::Dynamic, Nat::Read) => "GL_DYNAMIC_READ",
        }
    }
}

gl_enum! {
    pub enum BufferAccess {
        ReadOnly = gl::READ_ONLY => "GL_READ_ONLY",
        WriteOnly = gl::WRITE_ONLY => "GL_WRITE_ONLY",
        ReadWrite = gl::READ_WRITE => "GL_READ_WRITE",
    }
}

gl_enum! {
    pub enum BufferTarget {
        /// Vertex attributes
        ArrayBuffer = gl::ARRAY_BUFFER => "GL_ARRAY_BUFFER",
        /// Atomic counter storage
        AtomicCounter = gl::ATOMIC_COUNTER_BUFFER => "GL_ATOMIC_COUNTER_BUFFER",
        /// Buffer copy source
        CopyRead = gl::COPY_READ_BUFFER => "GL_COPY_READ_BUFFER",
        /// Buffer copy destination
        CopyWrite = gl::COPY_WRITE_BUFFER => "GL_COPY_WRITE_BUFFER",
        /// Indirect compute dispatch commands
        DispatchIndirect = gl::DISPATCH_INDIRECT_BUFFER => "GL_DISPATCH_INDIRECT_BUFFER",
        /// Indirect command arguments
        DrawIndirect = gl::DRAW_INDIRECT_BUFFER => "GL_DRAW_INDIRECT_BUFFER",
        /// Vertex array indices
        ElementArray = gl::ELEMENT_ARRAY_BUFFER => "GL_ELEMENT_ARRAY_BUFFER",
        /// Pixel read target
        PixelPack = gl::PIXEL_PACK_BUFFER => "GL_PIXEL_PACK_BUFFER",
        /// Texture data source
        PixelUnpack = gl::PIXEL_UNPACK_BUFFER => "GL_PIXEL_UNPACK_BUFFER",
        /// Query result buffer
        QueryBuffer = gl::QUERY_BUFFER => "GL_QUERY_BUFFER",
        /// Read-write storage for shaders
        ShaderStorage = gl::SHADER_STORAGE_BUFFER => "GL_SHADER_STORAGE_BUFFER",
        /// Texture data buffer
        Texture = gl::TEXTURE_BUFFER => "GL_TEXTURE_BUFFER",
        /// Transform feedback buffer
        TransformFeedback = gl::TRANSFORM_FEEDBACK_BUFFER => "GL_TRANSFORM_FEEDBACK_BUFFER",
        /// Uniform block storage
        Uniform = gl::UNIFORM_BUFFER => "GL_UNIFORM_BUFFER",
    }
}

impl BufferTarget {
    pub const ALL: [Self; 14] = [
        Self::ArrayBuffer,
        Self::AtomicCounter,
        Self::CopyRead,
        Self::CopyWrite,
        Self::DispatchIndirect,
        Self::DrawIndirect,
        Self::ElementArray,
        Self::PixelPack,
        Self::PixelUnpack,
        Self::QueryBuffer,
        Self::ShaderStorage,
        Self::Texture,
        Self::TransformFeedback,
        Self::Uniform,
    ];

    pub const fn can_bind_base(self) -> bool {
        matches!(
            self,
            Self::ShaderStorage | Self::Uniform | Self::AtomicCounter | Self::TransformFeedback
        )
    }

    /// The `glGet` token answering "which buffer is bound here".
    pub const fn binding_query(self) -> GLenum {
        match self {
            Self::ArrayBuffer => gl::ARRAY_BUFFER_BINDING,
            Self::AtomicCounter => gl::ATOMIC_COUNTER_BUFFER_BINDING,
            Self::CopyRead => gl::COPY_READ_BUFFER_BINDING,
            Self::CopyWrite => gl::COPY_WRITE_BUFFER_BINDING,
            Self::DispatchIndirect => gl::DISPATCH_INDIRECT_BUFFER_BINDING,
            Self::DrawIndirect => gl::DRAW_INDIRECT_BUFFER_BINDING,
            Self::ElementArray => gl::ELEMENT_ARRAY_BUFFER_BINDING,
            Self::PixelPack => gl::PIXEL_PACK_BUFFER_BINDING,
            Self::PixelUnpack => gl::PIXEL_UNPACK_BUFFER_BINDING,
            Self::QueryBuffer => gl::QUERY_BUFFER_BINDING,
            Self::ShaderStorage => gl::SHADER_STORAGE_BUFFER_BINDING,
            Self::Texture => gl::TEXTURE_BINDING_BUFFER,
            Self::TransformFeedback => gl::TRANSFORM_FEEDBACK_BUFFER_BINDING,
            Self::Uniform => gl::UNIFORM_BUFFER_BINDING,
        }
    }
}

pub struct BufferObject {
    handle: GLuint,
    target: BufferTarget,
}
has_handle!(BufferObject);

impl BufferObject {
    pub fn new(target: BufferTarget) -> Self {
        let mut handle = 0;
        unsafe { gl::GenBuffers(1, &mut handle) };
        assert_ne!(handle, 0, "Buffer generation failed.");
        unsafe { gl::BindBuffer(target.to_u32(), handle) };
        Self { handle, target }
    }

    pub fn target(&self) -> BufferTarget {
        self.target
    }

    pub fn bind(&self) {
        unsafe { gl::BindBuffer(self.target.to_u32(), self.handle) };
    }

    pub fn store<T>(&self, data: &[T], usage: DataUsage) {
        self.bind();
        unsafe {
            gl::BufferData(
                self.target.to_u32(),
                size_of_val(data) as GLsizeiptr,
                data.as_ptr().cast(),
                usage.to_u32(),
            );
        }
    }

    pub fn bind_base(&self, index: GLuint) {
        assert!(self.target.can_bind_base());
        unsafe { gl::BindBufferBase(self.target.to_u32(), index, self.handle) };
    }
}

/// Name of the buffer bound to a target, if any. Errors when the
/// context predates the target.
pub fn bound_buffer(target: BufferTarget) -> QueryResult<Option<GLuint>> {
    let handle = context::get_integer(target.binding_query())?;
    Ok((handle != 0).then_some(handle as GLuint))
}

/// Metadata the driver keeps for one buffer object.
#[derive(Debug, Clone, Copy)]
pub struct BufferInfo {
    pub handle: GLuint,
    pub target: BufferTarget,
    pub size_bytes: i64,
    pub usage: DataUsage,
    pub access: BufferAccess,
    pub mapped: bool,
    /// `glBufferStorage` allocations; contexts before 4.4 cannot answer.
    pub immutable: Option<bool>,
}

fn buffer_parameter(target: BufferTarget, pname: GLenum) -> QueryResult<GLint> {
    checked(|| {
        let mut value = 0;
        unsafe { gl::GetBufferParameteriv(target.to_u32(), pname, &mut value) };
        value
    })
}

impl BufferInfo {
    /// Queries `handle` through `target`, restoring whatever was bound
    /// there before.
    pub fn gather(target: BufferTarget, handle: GLuint) -> QueryResult<Self> {
        let previous = bound_buffer(target)?;
        checked(|| unsafe { gl::BindBuffer(target.to_u32(), handle) })?;
        let info = Self::gather_bound(target, handle);
        unsafe { gl::BindBuffer(target.to_u32(), previous.unwrap_or(0)) };
        info
    }

    fn gather_bound(target: BufferTarget, handle: GLuint) -> QueryResult<Self> {
        let size_bytes = checked(|| {
            let mut size = 0;
            unsafe { gl::GetBufferParameteri64v(target.to_u32(), gl::BUFFER_SIZE, &mut size) };
            size
        })?;

        let raw_usage = buffer_parameter(target, gl::BUFFER_USAGE)? as u32;
        let usage = DataUsage::from_raw(raw_usage).ok_or(QueryError::UnknownEnum {
            what: "buffer usage",
            raw: raw_usage,
        })?;

        let raw_access = buffer_parameter(target, gl::BUFFER_ACCESS)? as u32;
        let access = BufferAccess::from_raw(raw_access).ok_or(QueryError::UnknownEnum {
            what: "buffer access",
            raw: raw_access,
        })?;

        let mapped = buffer_parameter(target, gl::BUFFER_MAPPED)? != 0;
        let immutable = buffer_parameter(target, gl::BUFFER_IMMUTABLE_STORAGE)
            .ok()
            .map(|value| value != 0);

        Ok(Self {
            handle,
            target,
            size_bytes,
            usage,
            access,
            mapped,
            immutable,
        })
    }
}

impl fmt::Display for BufferInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "buffer {} on {}: {} bytes, {}, {}{}{}",
            self.handle,
            self.target.label(),
            self.size_bytes,
            self.usage.label(),
            self.access.label(),
            if self.mapped { ", mapped" } else { "" },
            match self.immutable {
                Some(true) => ", immutable",
                _ => "",
            },
        )
    }
}

/// Every target with a buffer bound right now. Targets the context does
/// not know are skipped.
pub fn current_buffer_info() -> Vec<BufferInfo> {
    let mut infos = Vec::new();
    for target in BufferTarget::ALL {
        let Ok(Some(handle)) = bound_buffer(target) else {
            continue;
        };
        if let Ok(info) = BufferInfo::gather(target, handle) {
            infos.push(info);
        }
    }
    infos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_round_trip() {
        for frequency in [Freq::Stream, Freq::Static, Freq::Dynamic] {
            for nature in [Nat::Draw, Nat::Read, Nat::Copy] {
                let usage = DataUsage::new(frequency, nature);
                assert_eq!(DataUsage::from_raw(usage.to_u32()), Some(usage));
            }
        }
        assert_eq!(DataUsage::from_raw(gl::FLOAT), None);
    }

    #[test]
    fn usage_labels() {
        assert_eq!(DataUsage::STATIC_DRAW.label(), "GL_STATIC_DRAW");
        assert_eq!(
            DataUsage::new(Freq::Dynamic, Nat::Read).label(),
            "GL_DYNAMIC_READ"
        );
    }

    #[test]
    fn binding_queries_are_distinct() {
        let mut queries: Vec<_> = BufferTarget::ALL
            .iter()
            .map(|target| target.binding_query())
            .collect();
        queries.sort_unstable();
        queries.dedup();
        assert_eq!(queries.len(), BufferTarget::ALL.len());
    }

    #[test]
    fn base_binding_targets() {
        assert!(BufferTarget::Uniform.can_bind_base());
        assert!(BufferTarget::ShaderStorage.can_bind_base());
        assert!(!BufferTarget::ArrayBuffer.can_bind_base());
        assert!(!BufferTarget::PixelPack.can_bind_base());
    }
}
