use color_eyre::{eyre::OptionExt, Result as EyreResult};
use glint::buffer::{self, BufferObject, BufferTarget, DataUsage};
use glint::context::ContextInfo;
use glint::glfw::{self, Window, WindowHint, OPENGL_CORE_PROFILE};
use glint::memory::MemoryInfo;
use glint::program;
use glint::shader::{Shader, ShaderProgram};
use glint::vertex::{VaoInfo, VertexArray};
use glint::GlErrorGuard;

const VERTEX_SRC: &str = r#"
#version 410 core

layout(location = 0) in vec2 position;
layout(location = 1) in vec2 uv;

layout(std140) uniform Params {
    vec4 tint;
    mat4 transform;
};

uniform float exposure;

out vec2 v_uv;

void main() {
    v_uv = uv * exposure;
    gl_Position = transform * vec4(position * tint.xy, 0.0, 1.0);
}
"#;

const FRAGMENT_SRC: &str = r#"
#version 410 core

in vec2 v_uv;
uniform sampler2D color_map;
out vec4 frag;

void main() {
    frag = texture(color_map, v_uv);
}
"#;

fn build_demo_program() -> EyreResult<ShaderProgram> {
    let vertex = Shader::vertex(VERTEX_SRC)?;
    let fragment = Shader::fragment(FRAGMENT_SRC)?;
    Ok(ShaderProgram::new(&[vertex, fragment])?)
}

/// std140 contents for the Params block: a tint vec4 followed by an
/// identity mat4.
fn params_block_data() -> [f32; 20] {
    let mut data = [0.0; 20];
    data[..4].copy_from_slice(&[0.25, 0.5, 0.75, 1.0]);
    for i in 0..4 {
        data[4 + i * 4 + i] = 1.0;
    }
    data
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;

    glfw::install_errors();
    glfw::init().ok_or_eyre("glfw init failed")?;

    glfw::window_hint(WindowHint::ContextVersionMajor, 4);
    glfw::window_hint(WindowHint::ContextVersionMinor, 1);
    glfw::window_hint(WindowHint::OpenGlProfile, OPENGL_CORE_PROFILE);
    glfw::window_hint(WindowHint::Visible, 0);

    let window = Window::create(640, 480, "glint probe")?;
    window.make_current();
    gl::load_with(glfw::get_proc_address);

    let size = window.get_framebuffer_size();

    println!("=== context ===");
    println!("{}", ContextInfo::gather()?);
    println!("framebuffer:  {}x{}", size.x, size.y);
    println!();
    println!("=== memory ===");
    println!("{}", MemoryInfo::gather());
    println!();

    let guard = GlErrorGuard::named("demo scene setup");

    let program = build_demo_program()?;

    // quad corners: position.xy, uv.xy
    let vertices: [f32; 16] = [
        -1.0, -1.0, 0.0, 0.0, //
        1.0, -1.0, 1.0, 0.0, //
        1.0, 1.0, 1.0, 1.0, //
        -1.0, 1.0, 0.0, 1.0, //
    ];
    let indices: [u32; 6] = [0, 1, 2, 0, 2, 3];

    let vao = VertexArray::new();
    let vertex_buffer = BufferObject::new(BufferTarget::ArrayBuffer);
    vertex_buffer.store(&vertices, DataUsage::STATIC_DRAW);
    vao.attach_f32_attrib(&vertex_buffer, 2, 16, 0);
    vao.attach_f32_attrib(&vertex_buffer, 2, 16, 8);

    let element_buffer = BufferObject::new(BufferTarget::ElementArray);
    element_buffer.store(&indices, DataUsage::STATIC_DRAW);

    let params = BufferObject::new(BufferTarget::Uniform);
    params.store(&params_block_data(), DataUsage::STATIC_DRAW);
    params.bind_base(0);
    program.set_block_binding(0, 0);

    let exposure = program.uniform_location("exposure")?;
    program.set_uniform_f32(exposure, 1.25);

    drop(guard);

    println!("=== program ===");
    println!("{}", program::ProgramInfo::gather(program.as_handle())?);
    println!();

    println!("=== attributes ===");
    for attrib in program::attributes(program.as_handle())? {
        println!("{attrib}");
    }
    println!();

    println!("=== uniforms ===");
    for uniform in program::uniforms(program.as_handle())? {
        println!("{uniform}");
    }
    println!();

    println!("=== uniform blocks ===");
    for block in program::uniform_blocks(program.as_handle())? {
        println!("{block}");
    }
    println!();

    println!("=== uniform values ===");
    println!(
        "exposure: {}",
        program::uniform_value(program.as_handle(), "exposure")?
    );
    println!(
        "Params.tint: {}",
        program::block_uniform_value(program.as_handle(), "Params", "tint")?
    );
    println!(
        "Params.transform: {}",
        program::block_uniform_value(program.as_handle(), "Params", "transform")?
    );
    println!();

    println!("=== bound buffers ===");
    vao.bind();
    for info in buffer::current_buffer_info() {
        println!("{info}");
    }
    println!();

    println!("=== vertex array ===");
    println!("{}", VaoInfo::gather(vao.as_handle())?);

    Ok(())
}
