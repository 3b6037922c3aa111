//! Vertex arrays: a small creation wrapper plus a dump of the attribute
//! state a VAO carries.

use std::cell::Cell;
use std::fmt;

use crate::buffer::BufferObject;
use crate::context;
use crate::error::{checked, QueryError, QueryResult};
use crate::{gl_enum, has_handle};
use gl::types::*;

gl_enum! {
    /// Component types a vertex attribute can be sourced from.
    pub enum AttrType {
        Byte = gl::BYTE => "GL_BYTE",
        UnsignedByte = gl::UNSIGNED_BYTE => "GL_UNSIGNED_BYTE",
        Short = gl::SHORT => "GL_SHORT",
        UnsignedShort = gl::UNSIGNED_SHORT => "GL_UNSIGNED_SHORT",
        Int = gl::INT => "GL_INT",
        UnsignedInt = gl::UNSIGNED_INT => "GL_UNSIGNED_INT",
        HalfFloat = gl::HALF_FLOAT => "GL_HALF_FLOAT",
        Float = gl::FLOAT => "GL_FLOAT",
        Double = gl::DOUBLE => "GL_DOUBLE",
        Fixed = gl::FIXED => "GL_FIXED",
        Int2_10_10_10Rev = gl::INT_2_10_10_10_REV => "GL_INT_2_10_10_10_REV",
        UnsignedInt2_10_10_10Rev = gl::UNSIGNED_INT_2_10_10_10_REV => "GL_UNSIGNED_INT_2_10_10_10_REV",
        UnsignedInt10F11F11FRev = gl::UNSIGNED_INT_10F_11F_11F_REV => "GL_UNSIGNED_INT_10F_11F_11F_REV",
    }
}

impl AttrType {
    pub const fn byte_size(self) -> u32 {
        match self {
            Self::Byte | Self::UnsignedByte => 1,
            Self::Short | Self::UnsignedShort | Self::HalfFloat => 2,
            Self::Double => 8,
            _ => 4,
        }
    }
}

pub struct VertexArray {
    handle: GLuint,
    next_attr_index: Cell<GLuint>,
}
has_handle!(VertexArray);

impl Default for VertexArray {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexArray {
    pub fn new() -> Self {
        let mut handle = 0;
        unsafe { gl::GenVertexArrays(1, &mut handle) };
        assert_ne!(handle, 0, "vertex array creation failed.");
        unsafe { gl::BindVertexArray(handle) };
        Self {
            handle,
            next_attr_index: Cell::new(0),
        }
    }

    pub fn bind(&self) {
        unsafe { gl::BindVertexArray(self.handle) };
    }

    /// Registers the next attribute index as `components` floats read
    /// from `buffer`.
    pub fn attach_f32_attrib(
        &self,
        buffer: &BufferObject,
        components: GLint,
        stride: GLsizei,
        offset: usize,
    ) -> GLuint {
        let index = self.next_attr_index.get();
        self.next_attr_index.set(index + 1);

        self.bind();
        buffer.bind();
        unsafe {
            gl::VertexAttribPointer(
                index,
                components,
                gl::FLOAT,
                gl::FALSE,
                stride,
                offset as *const _,
            );
            gl::EnableVertexAttribArray(index);
        }
        index
    }
}

/// State recorded for one enabled attribute slot.
#[derive(Debug, Clone, Copy)]
pub struct VertexAttribInfo {
    pub index: GLuint,
    pub components: GLint,
    pub ty: AttrType,
    pub normalized: bool,
    /// Declared with an integer internal format (`glVertexAttribIPointer`).
    pub integer: bool,
    pub stride: GLint,
    pub divisor: GLint,
    pub buffer: GLuint,
}

impl fmt::Display for VertexAttribInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "attrib {}: {} x {}, stride {}, buffer {}, divisor {}{}{}",
            self.index,
            self.components,
            self.ty.label(),
            self.stride,
            self.buffer,
            self.divisor,
            if self.normalized { ", normalized" } else { "" },
            if self.integer { ", integer" } else { "" },
        )
    }
}

fn vertex_attrib_parameter(index: GLuint, pname: GLenum) -> QueryResult<GLint> {
    checked(|| {
        let mut value = 0;
        unsafe { gl::GetVertexAttribiv(index, pname, &mut value) };
        value
    })
}

/// Everything a VAO remembers: its element buffer and each enabled
/// attribute.
#[derive(Debug, Clone)]
pub struct VaoInfo {
    pub handle: GLuint,
    pub element_buffer: Option<GLuint>,
    pub attribs: Vec<VertexAttribInfo>,
}

impl VaoInfo {
    /// Binds `vao` for the duration of the queries, restoring the
    /// previous binding before returning.
    pub fn gather(vao: GLuint) -> QueryResult<Self> {
        let previous = context::get_integer(gl::VERTEX_ARRAY_BINDING)? as GLuint;
        checked(|| unsafe { gl::BindVertexArray(vao) })?;
        let info = Self::gather_bound(vao);
        unsafe { gl::BindVertexArray(previous) };
        info
    }

    fn gather_bound(vao: GLuint) -> QueryResult<Self> {
        let element = context::get_integer(gl::ELEMENT_ARRAY_BUFFER_BINDING)? as GLuint;
        let max_attribs = context::get_integer(gl::MAX_VERTEX_ATTRIBS)? as GLuint;

        let mut attribs = Vec::new();
        for index in 0..max_attribs {
            if vertex_attrib_parameter(index, gl::VERTEX_ATTRIB_ARRAY_ENABLED)? == 0 {
                continue;
            }

            let raw_ty = vertex_attrib_parameter(index, gl::VERTEX_ATTRIB_ARRAY_TYPE)? as u32;
            let ty = AttrType::from_raw(raw_ty).ok_or(QueryError::UnknownEnum {
                what: "vertex attribute type",
                raw: raw_ty,
            })?;

            attribs.push(VertexAttribInfo {
                index,
                components: vertex_attrib_parameter(index, gl::VERTEX_ATTRIB_ARRAY_SIZE)?,
                ty,
                normalized: vertex_attrib_parameter(index, gl::VERTEX_ATTRIB_ARRAY_NORMALIZED)?
                    != 0,
                integer: vertex_attrib_parameter(index, gl::VERTEX_ATTRIB_ARRAY_INTEGER)? != 0,
                stride: vertex_attrib_parameter(index, gl::VERTEX_ATTRIB_ARRAY_STRIDE)?,
                divisor: vertex_attrib_parameter(index, gl::VERTEX_ATTRIB_ARRAY_DIVISOR)?,
                buffer: vertex_attrib_parameter(index, gl::VERTEX_ATTRIB_ARRAY_BUFFER_BINDING)?
                    as GLuint,
            });
        }

        Ok(Self {
            handle: vao,
            element_buffer: (element != 0).then_some(element),
            attribs,
        })
    }
}

impl fmt::Display for VaoInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vertex array {}", self.handle)?;
        match self.element_buffer {
            Some(element) => write!(f, ", element buffer {element}")?,
            None => write!(f, ", no element buffer")?,
        }
        for attrib in &self.attribs {
            write!(f, "\n  {attrib}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attr_type_sizes() {
        assert_eq!(AttrType::Float.byte_size(), 4);
        assert_eq!(AttrType::HalfFloat.byte_size(), 2);
        assert_eq!(AttrType::UnsignedByte.byte_size(), 1);
        assert_eq!(AttrType::Double.byte_size(), 8);
        // packed formats occupy one 4-byte word
        assert_eq!(AttrType::Int2_10_10_10Rev.byte_size(), 4);
    }

    #[test]
    fn attr_type_from_raw() {
        assert_eq!(AttrType::from_raw(gl::FLOAT), Some(AttrType::Float));
        assert_eq!(AttrType::from_raw(gl::FLOAT_VEC2), None);
    }
}
