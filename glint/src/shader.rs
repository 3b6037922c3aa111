//! Shader stage compilation and program linking, enough to give the
//! introspection queries something to chew on.

use crate::error::{QueryError, QueryResult};
use crate::{gl_enum, has_handle};
use gl::types::*;

gl_enum! {
    pub enum ShaderType {
        Compute = gl::COMPUTE_SHADER => "compute shader",
        Vertex = gl::VERTEX_SHADER => "vertex shader",
        TessControl = gl::TESS_CONTROL_SHADER => "tessellation control shader",
        TessEval = gl::TESS_EVALUATION_SHADER => "tessellation evaluation shader",
        Geometry = gl::GEOMETRY_SHADER => "geometry shader",
        Fragment = gl::FRAGMENT_SHADER => "fragment shader",
    }
}

fn shader_info_log(handle: GLuint) -> String {
    let mut log_size = 0;
    unsafe { gl::GetShaderiv(handle, gl::INFO_LOG_LENGTH, &mut log_size) };

    let mut info_log: Vec<u8> = Vec::with_capacity(log_size as usize);
    let mut bytes_written = 0;
    unsafe {
        gl::GetShaderInfoLog(
            handle,
            log_size,
            &mut bytes_written,
            info_log.as_mut_ptr().cast(),
        );
        info_log.set_len(bytes_written as usize);
    }
    String::from_utf8_lossy(&info_log).into_owned()
}

pub(crate) fn program_info_log(handle: GLuint) -> String {
    let mut log_size = 0;
    unsafe { gl::GetProgramiv(handle, gl::INFO_LOG_LENGTH, &mut log_size) };

    let mut info_log: Vec<u8> = Vec::with_capacity(log_size as usize);
    let mut bytes_written = 0;
    unsafe {
        gl::GetProgramInfoLog(
            handle,
            log_size,
            &mut bytes_written,
            info_log.as_mut_ptr().cast(),
        );
        info_log.set_len(bytes_written as usize);
    }
    String::from_utf8_lossy(&info_log).into_owned()
}

pub struct Shader {
    handle: GLuint,
}
has_handle!(Shader);

impl Shader {
    pub fn new(shader_type: ShaderType, source: &str) -> QueryResult<Self> {
        let handle = unsafe { gl::CreateShader(shader_type.to_u32()) };
        if handle == 0 {
            return Err(QueryError::ShaderCompile(
                "could not create a shader object".to_owned(),
            ));
        }

        let length = source.len() as GLint;
        let source_ptr = source.as_ptr().cast::<GLchar>();
        unsafe {
            gl::ShaderSource(handle, 1, &source_ptr, &length);
            gl::CompileShader(handle);
        }

        let mut success = 0;
        unsafe { gl::GetShaderiv(handle, gl::COMPILE_STATUS, &mut success) };
        if success == GLint::from(gl::FALSE) {
            let log = shader_info_log(handle);
            unsafe { gl::DeleteShader(handle) };
            return Err(QueryError::ShaderCompile(log));
        }

        Ok(Self { handle })
    }

    #[inline]
    pub fn vertex(source: &str) -> QueryResult<Self> {
        Self::new(ShaderType::Vertex, source)
    }

    #[inline]
    pub fn fragment(source: &str) -> QueryResult<Self> {
        Self::new(ShaderType::Fragment, source)
    }
}

pub struct ShaderProgram {
    handle: GLuint,
}
has_handle!(ShaderProgram);

impl ShaderProgram {
    pub fn new(shaders: &[Shader]) -> QueryResult<Self> {
        let handle = unsafe { gl::CreateProgram() };
        for shader in shaders {
            unsafe { gl::AttachShader(handle, shader.as_handle()) };
        }
        unsafe { gl::LinkProgram(handle) };

        let mut success = 0;
        unsafe { gl::GetProgramiv(handle, gl::LINK_STATUS, &mut success) };
        if success == GLint::from(gl::FALSE) {
            let log = program_info_log(handle);
            unsafe { gl::DeleteProgram(handle) };
            return Err(QueryError::ProgramLink(log));
        }

        Ok(Self { handle })
    }

    pub fn use_self(&self) {
        unsafe { gl::UseProgram(self.handle) };
    }

    pub fn uniform_location(&self, name: &str) -> QueryResult<GLint> {
        crate::program::uniform_location(self.handle, name)
    }

    pub fn set_uniform_f32(&self, location: GLint, value: f32) {
        unsafe { gl::ProgramUniform1f(self.handle, location, value) };
    }

    pub fn set_uniform_vec4(&self, location: GLint, value: [f32; 4]) {
        unsafe { gl::ProgramUniform4fv(self.handle, location, 1, value.as_ptr()) };
    }

    /// Routes a named uniform block to a buffer binding point.
    pub fn set_block_binding(&self, block_index: GLuint, binding: GLuint) {
        unsafe { gl::UniformBlockBinding(self.handle, block_index, binding) };
    }
}
