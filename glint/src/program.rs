//! Shader-program introspection: statuses, active attributes and
//! uniforms, uniform-block layout, and value read-back.

use std::ffi::CString;
use std::fmt;

use glint_utils::OptExt;

use crate::buffer::{bound_buffer, BufferTarget};
use crate::context;
use crate::error::{checked, QueryError, QueryResult};
use crate::gl_enum;
use crate::glsl::{GlslType, ScalarKind};
use crate::shader::{program_info_log, ShaderType};
use gl::types::*;

gl_enum! {
    pub enum TransformFeedbackMode {
        Interleaved = gl::INTERLEAVED_ATTRIBS => "interleaved attributes",
        Separate = gl::SEPARATE_ATTRIBS => "separate attributes",
    }
}

gl_enum! {
    /// Primitive kinds a geometry or tessellation stage declares.
    pub enum GlslPrimitive {
        Points = gl::POINTS => "points",
        Lines = gl::LINES => "lines",
        LineStrip = gl::LINE_STRIP => "line strip",
        LinesAdjacency = gl::LINES_ADJACENCY => "lines with adjacency",
        Triangles = gl::TRIANGLES => "triangles",
        TriangleStrip = gl::TRIANGLE_STRIP => "triangle strip",
        TrianglesAdjacency = gl::TRIANGLES_ADJACENCY => "triangles with adjacency",
        Quads = gl::QUADS => "quads",
        Isolines = gl::ISOLINES => "isolines",
    }
}

gl_enum! {
    pub enum TessSpacing {
        Equal = gl::EQUAL => "equal",
        FractionalEven = gl::FRACTIONAL_EVEN => "fractional even",
        FractionalOdd = gl::FRACTIONAL_ODD => "fractional odd",
    }
}

gl_enum! {
    pub enum VertexOrder {
        Cw = gl::CW => "clockwise",
        Ccw = gl::CCW => "counter-clockwise",
    }
}

fn c_name(name: &str) -> QueryResult<CString> {
    // an interior NUL can never name an active variable
    CString::new(name).map_err(|_| QueryError::Inactive(name.to_owned()))
}

fn ensure_program(program: GLuint) -> QueryResult<()> {
    let is_program = checked(|| unsafe { gl::IsProgram(program) })?;
    if is_program == gl::TRUE {
        Ok(())
    } else {
        Err(QueryError::NotAProgram(program))
    }
}

fn program_int(program: GLuint, pname: GLenum) -> QueryResult<GLint> {
    checked(|| {
        let mut value = 0;
        unsafe { gl::GetProgramiv(program, pname, &mut value) };
        value
    })
}

fn program_enum<T>(
    program: GLuint,
    pname: GLenum,
    what: &'static str,
    from_raw: impl FnOnce(u32) -> Option<T>,
) -> QueryResult<T> {
    let raw = program_int(program, pname)? as u32;
    from_raw(raw).ok_or(QueryError::UnknownEnum { what, raw })
}

pub fn uniform_location(program: GLuint, name: &str) -> QueryResult<GLint> {
    let c_str = c_name(name)?;
    let location = checked(|| unsafe { gl::GetUniformLocation(program, c_str.as_ptr()) })?;
    if location < 0 {
        return Err(QueryError::Inactive(name.to_owned()));
    }
    Ok(location)
}

fn uniform_index(program: GLuint, name: &str) -> QueryResult<GLuint> {
    let c_str = c_name(name)?;
    let index = checked(|| {
        let mut index = gl::INVALID_INDEX;
        unsafe { gl::GetUniformIndices(program, 1, &c_str.as_ptr(), &mut index) };
        index
    })?;
    if index == gl::INVALID_INDEX {
        return Err(QueryError::Inactive(name.to_owned()));
    }
    Ok(index)
}

/// name, array size and raw type of the active uniform at `index`.
fn active_uniform(
    program: GLuint,
    index: GLuint,
    name_capacity: GLint,
) -> QueryResult<(String, GLint, GLenum)> {
    checked(|| {
        let capacity = name_capacity.max(1);
        let mut name_buf = vec![0u8; capacity as usize];
        let mut written = 0;
        let mut array_size = 0;
        let mut raw_ty = 0;
        unsafe {
            gl::GetActiveUniform(
                program,
                index,
                capacity,
                &mut written,
                &mut array_size,
                &mut raw_ty,
                name_buf.as_mut_ptr().cast(),
            );
        }
        let name = String::from_utf8_lossy(&name_buf[..written.max(0) as usize]).into_owned();
        (name, array_size, raw_ty)
    })
}

fn uniforms_iv(program: GLuint, indices: &[GLuint], pname: GLenum) -> QueryResult<Vec<GLint>> {
    checked(|| {
        let mut values = vec![0; indices.len()];
        unsafe {
            gl::GetActiveUniformsiv(
                program,
                indices.len() as GLsizei,
                indices.as_ptr(),
                pname,
                values.as_mut_ptr(),
            );
        }
        values
    })
}

fn uniform_iv(program: GLuint, index: GLuint, pname: GLenum) -> QueryResult<GLint> {
    Ok(uniforms_iv(program, &[index], pname)?[0])
}

fn block_parameter(program: GLuint, block: GLuint, pname: GLenum) -> QueryResult<GLint> {
    checked(|| {
        let mut value = 0;
        unsafe { gl::GetActiveUniformBlockiv(program, block, pname, &mut value) };
        value
    })
}

fn glsl_type(raw: GLenum, what: &'static str) -> QueryResult<GlslType> {
    GlslType::from_raw(raw).ok_or(QueryError::UnknownEnum { what, raw })
}

#[derive(Debug, Clone, Copy)]
pub struct TransformFeedbackInfo {
    pub mode: TransformFeedbackMode,
    pub varyings: GLint,
}

#[derive(Debug, Clone, Copy)]
pub struct GeometryInfo {
    pub input: GlslPrimitive,
    pub output: GlslPrimitive,
    pub vertices_out: GLint,
}

#[derive(Debug, Clone, Copy)]
pub struct TessellationInfo {
    /// Patch size out of the control stage; absent without one.
    pub control_output_vertices: Option<GLint>,
    pub gen_mode: GlslPrimitive,
    pub spacing: TessSpacing,
    pub vertex_order: VertexOrder,
    pub point_mode: bool,
}

/// The link-level view of a program.
#[derive(Debug, Clone)]
pub struct ProgramInfo {
    pub handle: GLuint,
    pub shaders: Vec<ShaderType>,
    pub delete_status: bool,
    pub link_status: bool,
    pub validate_status: bool,
    pub info_log: Option<String>,
    pub active_attributes: GLint,
    pub active_uniforms: GLint,
    pub active_uniform_blocks: GLint,
    pub binary_length: GLint,
    pub transform_feedback: Option<TransformFeedbackInfo>,
    pub geometry: Option<GeometryInfo>,
    pub tessellation: Option<TessellationInfo>,
}

fn attached_shader_types(program: GLuint) -> QueryResult<Vec<ShaderType>> {
    let count = program_int(program, gl::ATTACHED_SHADERS)?;
    let handles = checked(|| {
        let mut handles = vec![0; count.max(0) as usize];
        let mut written = 0;
        unsafe {
            gl::GetAttachedShaders(program, count, &mut written, handles.as_mut_ptr());
        }
        handles.truncate(written.max(0) as usize);
        handles
    })?;

    handles
        .into_iter()
        .map(|handle| {
            let raw = checked(|| {
                let mut raw = 0;
                unsafe { gl::GetShaderiv(handle, gl::SHADER_TYPE, &mut raw) };
                raw
            })? as u32;
            ShaderType::from_raw(raw).ok_or(QueryError::UnknownEnum {
                what: "shader type",
                raw,
            })
        })
        .collect()
}

impl ProgramInfo {
    pub fn gather(program: GLuint) -> QueryResult<Self> {
        ensure_program(program)?;

        let shaders = attached_shader_types(program)?;

        let info_log = if program_int(program, gl::INFO_LOG_LENGTH)? > 1 {
            Some(program_info_log(program))
        } else {
            None
        };

        let varyings = program_int(program, gl::TRANSFORM_FEEDBACK_VARYINGS)?;
        let transform_feedback = if varyings > 0 {
            Some(TransformFeedbackInfo {
                mode: program_enum(
                    program,
                    gl::TRANSFORM_FEEDBACK_BUFFER_MODE,
                    "transform feedback mode",
                    TransformFeedbackMode::from_raw,
                )?,
                varyings,
            })
        } else {
            None
        };

        // stage queries answer with INVALID_OPERATION when the stage is absent
        let geometry = match program_int(program, gl::GEOMETRY_VERTICES_OUT) {
            Ok(vertices_out) => Some(GeometryInfo {
                input: program_enum(
                    program,
                    gl::GEOMETRY_INPUT_TYPE,
                    "geometry input primitive",
                    GlslPrimitive::from_raw,
                )?,
                output: program_enum(
                    program,
                    gl::GEOMETRY_OUTPUT_TYPE,
                    "geometry output primitive",
                    GlslPrimitive::from_raw,
                )?,
                vertices_out,
            }),
            Err(_) => None,
        };

        let tessellation = match program_int(program, gl::TESS_GEN_MODE) {
            Ok(raw_mode) => Some(TessellationInfo {
                control_output_vertices: program_int(program, gl::TESS_CONTROL_OUTPUT_VERTICES)
                    .ok(),
                gen_mode: GlslPrimitive::from_raw(raw_mode as u32).ok_or(
                    QueryError::UnknownEnum {
                        what: "tessellation mode",
                        raw: raw_mode as u32,
                    },
                )?,
                spacing: program_enum(
                    program,
                    gl::TESS_GEN_SPACING,
                    "tessellation spacing",
                    TessSpacing::from_raw,
                )?,
                vertex_order: program_enum(
                    program,
                    gl::TESS_GEN_VERTEX_ORDER,
                    "tessellation vertex order",
                    VertexOrder::from_raw,
                )?,
                point_mode: program_int(program, gl::TESS_GEN_POINT_MODE)? != 0,
            }),
            Err(_) => None,
        };

        Ok(Self {
            handle: program,
            shaders,
            delete_status: program_int(program, gl::DELETE_STATUS)? != 0,
            link_status: program_int(program, gl::LINK_STATUS)? != 0,
            validate_status: program_int(program, gl::VALIDATE_STATUS)? != 0,
            info_log,
            active_attributes: program_int(program, gl::ACTIVE_ATTRIBUTES)?,
            active_uniforms: program_int(program, gl::ACTIVE_UNIFORMS)?,
            active_uniform_blocks: program_int(program, gl::ACTIVE_UNIFORM_BLOCKS)?,
            binary_length: program_int(program, gl::PROGRAM_BINARY_LENGTH)?,
            transform_feedback,
            geometry,
            tessellation,
        })
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

impl fmt::Display for ProgramInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "program {}", self.handle)?;

        write!(f, "  shaders:          ")?;
        if self.shaders.is_empty() {
            writeln!(f, "none attached")?;
        } else {
            for (i, shader) in self.shaders.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", shader.label())?;
            }
            writeln!(f)?;
        }

        writeln!(f, "  link status:      {}", yes_no(self.link_status))?;
        writeln!(f, "  validate status:  {}", yes_no(self.validate_status))?;
        writeln!(f, "  delete status:    {}", yes_no(self.delete_status))?;
        writeln!(f, "  attributes:       {}", self.active_attributes)?;
        writeln!(f, "  uniforms:         {}", self.active_uniforms)?;
        writeln!(f, "  uniform blocks:   {}", self.active_uniform_blocks)?;
        write!(f, "  binary length:    {}", self.binary_length)?;

        if let Some(tf) = &self.transform_feedback {
            write!(
                f,
                "\n  transform feedback: {} varyings, {}",
                tf.varyings,
                tf.mode.label()
            )?;
        }
        if let Some(geometry) = &self.geometry {
            write!(
                f,
                "\n  geometry: {} in, {} out, max {} vertices",
                geometry.input.label(),
                geometry.output.label(),
                geometry.vertices_out
            )?;
        }
        if let Some(tess) = &self.tessellation {
            write!(
                f,
                "\n  tessellation: {}, {} spacing, {}{}",
                tess.gen_mode.label(),
                tess.spacing.label(),
                tess.vertex_order.label(),
                if tess.point_mode { ", point mode" } else { "" }
            )?;
            if let Some(vertices) = tess.control_output_vertices {
                write!(f, ", {vertices} control points")?;
            }
        }
        if let Some(log) = &self.info_log {
            write!(f, "\n  info log:")?;
            for line in log.lines() {
                write!(f, "\n   | {line}")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ActiveAttrib {
    pub name: String,
    pub ty: GlslType,
    pub location: GLint,
    pub array_size: GLint,
}

impl fmt::Display for ActiveAttrib {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "location {}: {} {}", self.location, self.ty.name(), self.name)?;
        if self.array_size > 1 {
            write!(f, "[{}]", self.array_size)?;
        }
        Ok(())
    }
}

/// Active vertex attributes of a linked program.
pub fn attributes(program: GLuint) -> QueryResult<Vec<ActiveAttrib>> {
    ensure_program(program)?;

    let count = program_int(program, gl::ACTIVE_ATTRIBUTES)?;
    let capacity = program_int(program, gl::ACTIVE_ATTRIBUTE_MAX_LENGTH)?.max(1);

    (0..count as GLuint)
        .map(|index| {
            let (name, array_size, raw_ty) = checked(|| {
                let mut name_buf = vec![0u8; capacity as usize];
                let mut written = 0;
                let mut array_size = 0;
                let mut raw_ty = 0;
                unsafe {
                    gl::GetActiveAttrib(
                        program,
                        index,
                        capacity,
                        &mut written,
                        &mut array_size,
                        &mut raw_ty,
                        name_buf.as_mut_ptr().cast(),
                    );
                }
                let name =
                    String::from_utf8_lossy(&name_buf[..written.max(0) as usize]).into_owned();
                (name, array_size, raw_ty)
            })?;

            let c_str = c_name(&name)?;
            let location =
                checked(|| unsafe { gl::GetAttribLocation(program, c_str.as_ptr()) })?;

            Ok(ActiveAttrib {
                ty: glsl_type(raw_ty, "attribute type")?,
                name,
                location,
                array_size,
            })
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct ActiveUniform {
    pub name: String,
    pub ty: GlslType,
    pub array_size: GLint,
    /// Set for default-block uniforms only.
    pub location: Option<GLint>,
    /// Set for uniforms living in a named block.
    pub block_index: Option<GLuint>,
}

impl fmt::Display for ActiveUniform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.location, self.block_index) {
            (Some(location), _) => write!(f, "location {location}: ")?,
            (None, Some(block)) => write!(f, "block {block}: ")?,
            (None, None) => {}
        }
        write!(f, "{} {}", self.ty.name(), self.name)?;
        if self.array_size > 1 {
            write!(f, "[{}]", self.array_size)?;
        }
        Ok(())
    }
}

/// Every active uniform, both default-block and named-block members.
pub fn uniforms(program: GLuint) -> QueryResult<Vec<ActiveUniform>> {
    ensure_program(program)?;

    let count = program_int(program, gl::ACTIVE_UNIFORMS)?;
    let capacity = program_int(program, gl::ACTIVE_UNIFORM_MAX_LENGTH)?;

    (0..count as GLuint)
        .map(|index| {
            let (name, array_size, raw_ty) = active_uniform(program, index, capacity)?;
            let ty = glsl_type(raw_ty, "uniform type")?;

            let block = uniform_iv(program, index, gl::UNIFORM_BLOCK_INDEX)?;
            let (location, block_index) = if block < 0 {
                (Some(uniform_location(program, &name)?), None)
            } else {
                (None, Some(block as GLuint))
            };

            Ok(ActiveUniform {
                name,
                ty,
                array_size,
                location,
                block_index,
            })
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct BlockMember {
    pub name: String,
    pub ty: GlslType,
    pub array_size: GLint,
    pub offset: GLint,
    pub array_stride: GLint,
    pub matrix_stride: GLint,
    pub row_major: bool,
    pub size_bytes: GLint,
}

#[derive(Debug, Clone)]
pub struct UniformBlockInfo {
    pub name: String,
    pub index: GLuint,
    pub binding: GLint,
    pub data_size: GLint,
    pub members: Vec<BlockMember>,
}

fn block_name(program: GLuint, block: GLuint, capacity: GLint) -> QueryResult<String> {
    checked(|| {
        let capacity = capacity.max(1);
        let mut name_buf = vec![0u8; capacity as usize];
        let mut written = 0;
        unsafe {
            gl::GetActiveUniformBlockName(
                program,
                block,
                capacity,
                &mut written,
                name_buf.as_mut_ptr().cast(),
            );
        }
        String::from_utf8_lossy(&name_buf[..written.max(0) as usize]).into_owned()
    })
}

fn block_members(program: GLuint, block: GLuint) -> QueryResult<Vec<BlockMember>> {
    let count = block_parameter(program, block, gl::UNIFORM_BLOCK_ACTIVE_UNIFORMS)?;
    let indices = checked(|| {
        let mut indices = vec![0 as GLint; count.max(0) as usize];
        unsafe {
            gl::GetActiveUniformBlockiv(
                program,
                block,
                gl::UNIFORM_BLOCK_ACTIVE_UNIFORM_INDICES,
                indices.as_mut_ptr(),
            );
        }
        indices
    })?;
    let indices: Vec<GLuint> = indices.into_iter().map(|index| index as GLuint).collect();

    let name_capacity = program_int(program, gl::ACTIVE_UNIFORM_MAX_LENGTH)?;
    let offsets = uniforms_iv(program, &indices, gl::UNIFORM_OFFSET)?;
    let array_strides = uniforms_iv(program, &indices, gl::UNIFORM_ARRAY_STRIDE)?;
    let matrix_strides = uniforms_iv(program, &indices, gl::UNIFORM_MATRIX_STRIDE)?;
    let row_major = uniforms_iv(program, &indices, gl::UNIFORM_IS_ROW_MAJOR)?;

    let mut members = Vec::with_capacity(indices.len());
    for (i, &index) in indices.iter().enumerate() {
        let (name, array_size, raw_ty) = active_uniform(program, index, name_capacity)?;
        let ty = glsl_type(raw_ty, "uniform type")?;
        members.push(BlockMember {
            size_bytes: ty.block_member_size(array_size, array_strides[i], matrix_strides[i]),
            name,
            ty,
            array_size,
            offset: offsets[i],
            array_stride: array_strides[i],
            matrix_stride: matrix_strides[i],
            row_major: row_major[i] != 0,
        });
    }
    members.sort_by_key(|member| member.offset);
    Ok(members)
}

impl UniformBlockInfo {
    pub fn gather(program: GLuint, block: GLuint) -> QueryResult<Self> {
        ensure_program(program)?;
        let name_capacity =
            program_int(program, gl::ACTIVE_UNIFORM_BLOCK_MAX_NAME_LENGTH)?;
        Ok(Self {
            name: block_name(program, block, name_capacity)?,
            index: block,
            binding: block_parameter(program, block, gl::UNIFORM_BLOCK_BINDING)?,
            data_size: block_parameter(program, block, gl::UNIFORM_BLOCK_DATA_SIZE)?,
            members: block_members(program, block)?,
        })
    }
}

/// Layout of every active uniform block in the program.
pub fn uniform_blocks(program: GLuint) -> QueryResult<Vec<UniformBlockInfo>> {
    ensure_program(program)?;
    let count = program_int(program, gl::ACTIVE_UNIFORM_BLOCKS)?;
    (0..count as GLuint)
        .map(|block| UniformBlockInfo::gather(program, block))
        .collect()
}

impl fmt::Display for UniformBlockInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "uniform block {:?} (index {}): binding {}, {} bytes",
            self.name, self.index, self.binding, self.data_size
        )?;
        for member in &self.members {
            write!(
                f,
                "\n  offset {:>4}: {} {}",
                member.offset,
                member.ty.name(),
                member.name
            )?;
            if member.array_size > 1 {
                write!(f, "[{}]", member.array_size)?;
            }
            write!(f, " ({} bytes", member.size_bytes)?;
            if member.row_major {
                write!(f, ", row major")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Components of one uniform, in column-major order.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformData {
    Float(Vec<f32>),
    Double(Vec<f64>),
    Int(Vec<i32>),
    UInt(Vec<u32>),
}

impl UniformData {
    pub fn len(&self) -> usize {
        match self {
            Self::Float(values) => values.len(),
            Self::Double(values) => values.len(),
            Self::Int(values) => values.len(),
            Self::UInt(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn component(&self, i: usize) -> String {
        match self {
            Self::Float(values) => values[i].to_string(),
            Self::Double(values) => values[i].to_string(),
            Self::Int(values) => values[i].to_string(),
            Self::UInt(values) => values[i].to_string(),
        }
    }
}

/// A read-back uniform value with enough shape to print itself.
#[derive(Debug, Clone)]
pub struct UniformValue {
    pub ty: GlslType,
    pub array_size: GLint,
    pub data: UniformData,
}

impl fmt::Display for UniformValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.ty.rows() as usize;
        let cols = self.ty.columns() as usize;
        let comps = rows * cols;
        let elements = self.data.len() / comps;

        write!(f, "{}", self.ty.name())?;
        if self.array_size > 1 {
            write!(f, "[{}]", self.array_size)?;
        }
        write!(f, " =")?;

        for element in 0..elements {
            let base = element * comps;
            if self.ty.is_matrix() {
                // one line per matrix row
                for r in 0..rows {
                    write!(f, "\n  [")?;
                    for c in 0..cols {
                        if c > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", self.data.component(base + c * rows + r))?;
                    }
                    write!(f, "]")?;
                }
            } else if cols > 1 {
                write!(f, " [")?;
                for c in 0..cols {
                    if c > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", self.data.component(base + c))?;
                }
                write!(f, "]")?;
            } else {
                write!(f, " {}", self.data.component(base))?;
            }
        }
        Ok(())
    }
}

fn read_uniform(
    program: GLuint,
    location: GLint,
    kind: ScalarKind,
    comps: usize,
) -> QueryResult<UniformData> {
    checked(|| match kind {
        ScalarKind::Float => {
            let mut values = vec![0f32; comps];
            unsafe { gl::GetUniformfv(program, location, values.as_mut_ptr()) };
            UniformData::Float(values)
        }
        ScalarKind::Double => {
            let mut values = vec![0f64; comps];
            unsafe { gl::GetUniformdv(program, location, values.as_mut_ptr()) };
            UniformData::Double(values)
        }
        ScalarKind::Int | ScalarKind::Bool => {
            let mut values = vec![0i32; comps];
            unsafe { gl::GetUniformiv(program, location, values.as_mut_ptr()) };
            UniformData::Int(values)
        }
        ScalarKind::UInt => {
            let mut values = vec![0u32; comps];
            unsafe { gl::GetUniformuiv(program, location, values.as_mut_ptr()) };
            UniformData::UInt(values)
        }
    })
}

/// Reads the value of a default-block uniform. For arrays this reads the
/// element the given name resolves to.
pub fn uniform_value(program: GLuint, name: &str) -> QueryResult<UniformValue> {
    ensure_program(program)?;

    let location = uniform_location(program, name)?;
    let index = uniform_index(program, name)?;
    let capacity = program_int(program, gl::ACTIVE_UNIFORM_MAX_LENGTH)?;
    let (_, array_size, raw_ty) = active_uniform(program, index, capacity)?;
    let ty = glsl_type(raw_ty, "uniform type")?;

    let data = read_uniform(
        program,
        location,
        ty.scalar(),
        ty.component_count() as usize,
    )?;
    Ok(UniformValue {
        ty,
        array_size,
        data,
    })
}

/// Lays out the byte offsets of every component of a block member, in
/// column-major component order.
fn member_component_offsets(
    ty: GlslType,
    array_size: GLint,
    array_stride: GLint,
    matrix_stride: GLint,
    row_major: bool,
) -> Vec<usize> {
    let rows = ty.rows() as usize;
    let cols = ty.columns() as usize;
    let scalar_size = ty.scalar().byte_size() as usize;
    let elements = if array_stride > 0 {
        array_size.max(1) as usize
    } else {
        1
    };

    let mut offsets = Vec::with_capacity(elements * rows * cols);
    for element in 0..elements {
        let base = element * array_stride.max(0) as usize;
        if matrix_stride > 0 {
            let matrix_stride = matrix_stride as usize;
            for c in 0..cols {
                for r in 0..rows {
                    let offset = if row_major {
                        r * matrix_stride + c * scalar_size
                    } else {
                        c * matrix_stride + r * scalar_size
                    };
                    offsets.push(base + offset);
                }
            }
        } else {
            for component in 0..rows * cols {
                offsets.push(base + component * scalar_size);
            }
        }
    }
    offsets
}

/// Decodes raw uniform-buffer bytes into components, honoring the
/// strides the driver reported.
fn decode_block_bytes(
    bytes: &[u8],
    ty: GlslType,
    array_size: GLint,
    array_stride: GLint,
    matrix_stride: GLint,
    row_major: bool,
) -> QueryResult<UniformData> {
    let offsets = member_component_offsets(ty, array_size, array_stride, matrix_stride, row_major);
    let scalar_size = ty.scalar().byte_size() as usize;
    if offsets.iter().any(|&offset| offset + scalar_size > bytes.len()) {
        return Err(QueryError::ShortRead);
    }

    let read4 = |offset: usize| -> [u8; 4] { bytes[offset..offset + 4].try_into().unwrap_unreach() };
    let read8 = |offset: usize| -> [u8; 8] { bytes[offset..offset + 8].try_into().unwrap_unreach() };

    Ok(match ty.scalar() {
        ScalarKind::Float => UniformData::Float(
            offsets.iter().map(|&o| f32::from_ne_bytes(read4(o))).collect(),
        ),
        ScalarKind::Double => UniformData::Double(
            offsets.iter().map(|&o| f64::from_ne_bytes(read8(o))).collect(),
        ),
        ScalarKind::Int | ScalarKind::Bool => UniformData::Int(
            offsets.iter().map(|&o| i32::from_ne_bytes(read4(o))).collect(),
        ),
        ScalarKind::UInt => UniformData::UInt(
            offsets.iter().map(|&o| u32::from_ne_bytes(read4(o))).collect(),
        ),
    })
}

/// Reads the current value of a named-block uniform out of the buffer
/// bound to the block's binding point. The read goes through the
/// copy-read target so no uniform binding is disturbed.
pub fn block_uniform_value(
    program: GLuint,
    block_name: &str,
    uniform_name: &str,
) -> QueryResult<UniformValue> {
    ensure_program(program)?;

    let c_block = c_name(block_name)?;
    let block =
        checked(|| unsafe { gl::GetUniformBlockIndex(program, c_block.as_ptr()) })?;
    if block == gl::INVALID_INDEX {
        return Err(QueryError::Inactive(block_name.to_owned()));
    }

    let index = uniform_index(program, uniform_name)?;
    if uniform_iv(program, index, gl::UNIFORM_BLOCK_INDEX)? != block as GLint {
        return Err(QueryError::Inactive(uniform_name.to_owned()));
    }

    let binding = block_parameter(program, block, gl::UNIFORM_BLOCK_BINDING)? as GLuint;
    let buffer = context::get_indexed_integer(gl::UNIFORM_BUFFER_BINDING, binding)? as GLuint;
    if buffer == 0 {
        return Err(QueryError::NoBufferBound(binding));
    }

    let capacity = program_int(program, gl::ACTIVE_UNIFORM_MAX_LENGTH)?;
    let (_, array_size, raw_ty) = active_uniform(program, index, capacity)?;
    let ty = glsl_type(raw_ty, "uniform type")?;

    let offset = uniform_iv(program, index, gl::UNIFORM_OFFSET)?;
    let array_stride = uniform_iv(program, index, gl::UNIFORM_ARRAY_STRIDE)?;
    let matrix_stride = uniform_iv(program, index, gl::UNIFORM_MATRIX_STRIDE)?;
    let row_major = uniform_iv(program, index, gl::UNIFORM_IS_ROW_MAJOR)? != 0;
    if offset < 0 {
        return Err(QueryError::Inactive(uniform_name.to_owned()));
    }

    let size_bytes = ty.block_member_size(array_size, array_stride, matrix_stride);

    let previous = bound_buffer(BufferTarget::CopyRead)?;
    let copy_read = BufferTarget::CopyRead.to_u32();
    checked(|| unsafe { gl::BindBuffer(copy_read, buffer) })?;
    let bytes = checked(|| {
        let mut bytes = vec![0u8; size_bytes.max(0) as usize];
        unsafe {
            gl::GetBufferSubData(
                copy_read,
                offset as GLintptr,
                size_bytes as GLsizeiptr,
                bytes.as_mut_ptr().cast(),
            );
        }
        bytes
    });
    unsafe { gl::BindBuffer(copy_read, previous.unwrap_or(0)) };

    let data = decode_block_bytes(&bytes?, ty, array_size, array_stride, matrix_stride, row_major)?;
    Ok(UniformValue {
        ty,
        array_size,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_plain_vec4() {
        let mut bytes = Vec::new();
        for value in [1.0f32, 2.0, 3.0, 4.0] {
            bytes.extend_from_slice(&value.to_ne_bytes());
        }
        let data =
            decode_block_bytes(&bytes, GlslType::FloatVec4, 1, -1, -1, false).unwrap();
        assert_eq!(data, UniformData::Float(vec![1.0, 2.0, 3.0, 4.0]));
    }

    #[test]
    fn decode_column_major_mat2_with_stride() {
        // two columns padded to 16 bytes each, column c holding [c*10, c*10+1]
        let mut bytes = vec![0u8; 32];
        for c in 0..2 {
            for r in 0..2 {
                let value = (c * 10 + r) as f32;
                let offset = c * 16 + r * 4;
                bytes[offset..offset + 4].copy_from_slice(&value.to_ne_bytes());
            }
        }
        let data = decode_block_bytes(&bytes, GlslType::Mat2, 1, -1, 16, false).unwrap();
        assert_eq!(data, UniformData::Float(vec![0.0, 1.0, 10.0, 11.0]));
    }

    #[test]
    fn decode_row_major_mat2_matches_column_major_layout() {
        // row-major storage of the same matrix: row r at stride 16
        let mut bytes = vec![0u8; 32];
        for r in 0..2 {
            for c in 0..2 {
                let value = (c * 10 + r) as f32;
                let offset = r * 16 + c * 4;
                bytes[offset..offset + 4].copy_from_slice(&value.to_ne_bytes());
            }
        }
        let data = decode_block_bytes(&bytes, GlslType::Mat2, 1, -1, 16, true).unwrap();
        // components come out in column-major order either way
        assert_eq!(data, UniformData::Float(vec![0.0, 1.0, 10.0, 11.0]));
    }

    #[test]
    fn decode_float_array_with_std140_stride() {
        // three floats, 16 bytes apart
        let mut bytes = vec![0u8; 48];
        for element in 0..3 {
            let value = element as f32 + 0.5;
            let offset = element * 16;
            bytes[offset..offset + 4].copy_from_slice(&value.to_ne_bytes());
        }
        let data = decode_block_bytes(&bytes, GlslType::Float, 3, 16, -1, false).unwrap();
        assert_eq!(data, UniformData::Float(vec![0.5, 1.5, 2.5]));
    }

    #[test]
    fn decode_short_buffer_is_an_error() {
        let bytes = vec![0u8; 8];
        assert!(matches!(
            decode_block_bytes(&bytes, GlslType::FloatVec4, 1, -1, -1, false),
            Err(QueryError::ShortRead)
        ));
    }

    #[test]
    fn decode_int_vector() {
        let mut bytes = Vec::new();
        for value in [-3i32, 7] {
            bytes.extend_from_slice(&value.to_ne_bytes());
        }
        let data = decode_block_bytes(&bytes, GlslType::IntVec2, 1, -1, -1, false).unwrap();
        assert_eq!(data, UniformData::Int(vec![-3, 7]));
    }

    #[test]
    fn value_display_scalar() {
        let value = UniformValue {
            ty: GlslType::Float,
            array_size: 1,
            data: UniformData::Float(vec![2.5]),
        };
        assert_eq!(value.to_string(), "float = 2.5");
    }

    #[test]
    fn value_display_vector() {
        let value = UniformValue {
            ty: GlslType::IntVec3,
            array_size: 1,
            data: UniformData::Int(vec![1, 2, 3]),
        };
        assert_eq!(value.to_string(), "ivec3 = [1, 2, 3]");
    }

    #[test]
    fn value_display_matrix_rows() {
        // identity mat2 in column-major order
        let value = UniformValue {
            ty: GlslType::Mat2,
            array_size: 1,
            data: UniformData::Float(vec![1.0, 0.0, 0.0, 1.0]),
        };
        assert_eq!(value.to_string(), "mat2 =\n  [1, 0]\n  [0, 1]");
    }

    #[test]
    fn value_display_array() {
        let value = UniformValue {
            ty: GlslType::Float,
            array_size: 2,
            data: UniformData::Float(vec![1.0, 2.0]),
        };
        assert_eq!(value.to_string(), "float[2] = 1 2");
    }
}
