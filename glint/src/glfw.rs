//! Just enough raw GLFW to stand up an invisible context for the demo
//! binary.

use color_eyre::{eyre::eyre, Result as EyreResult};
use glam::IVec2;
use glint_utils::OptExt;
use std::{
    ffi::{c_void, CStr, CString},
    ptr::{self, NonNull},
};

use glfw::ffi;

#[repr(i32)]
#[derive(Debug, Clone, Copy)]
pub enum GlfwError {
    NotInitialized,
    NoCurrentContext,
    InvalidEnum,
    InvalidValue,
    OutOfMemory,
    ApiUnavailable,
    VersionUnavailable,
    PlatformError,
    FormatUnavailable,
    NoWindowContext,
    CursorUnavilable,
    FeatureUnavailable,
    FeatureUnimplemented,
    PlatformUnavailable,
}

impl GlfwError {
    pub fn from_num(err: i32) -> Option<Self> {
        Some(match err {
            0 => return None,
            0x00010001 => Self::NotInitialized,
            0x00010002 => Self::NoCurrentContext,
            0x00010003 => Self::InvalidEnum,
            0x00010004 => Self::InvalidValue,
            0x00010005 => Self::OutOfMemory,
            0x00010006 => Self::ApiUnavailable,
            0x00010007 => Self::VersionUnavailable,
            0x00010008 => Self::PlatformError,
            0x00010009 => Self::FormatUnavailable,
            0x0001000a => Self::NoWindowContext,
            0x0001000b => Self::CursorUnavilable,
            0x0001000c => Self::FeatureUnavailable,
            0x0001000d => Self::FeatureUnimplemented,
            0x0001000e => Self::PlatformUnavailable,
            _ => unreachable!(),
        })
    }
}

extern "C" fn err_callback(err: i32, desc: *const i8) {
    let err = GlfwError::from_num(err).unwrap_unreach();
    let desc = unsafe { CStr::from_ptr(desc).to_str().unwrap() };
    println!("Error occured: {err:?}");
    println!("Description: {desc}");
}

pub fn init() -> Option<()> {
    let err = unsafe { ffi::glfwInit() };
    (err == 1).then_some(())
}

pub fn install_errors() {
    unsafe { ffi::glfwSetErrorCallback(Some(err_callback)) };
}

pub fn get_proc_address(name: &'static str) -> *const c_void {
    let name = CString::new(name).unwrap_unreach();
    unsafe { ffi::glfwGetProcAddress(name.as_ptr()) }
}

#[repr(i32)]
#[derive(Debug, Clone, Copy)]
pub enum WindowHint {
    ContextVersionMajor = ffi::CONTEXT_VERSION_MAJOR,
    ContextVersionMinor = ffi::CONTEXT_VERSION_MINOR,
    OpenGlProfile = ffi::OPENGL_PROFILE,
    Visible = ffi::VISIBLE,
}

pub const OPENGL_CORE_PROFILE: i32 = ffi::OPENGL_CORE_PROFILE;

pub fn window_hint(hint: WindowHint, value: i32) {
    unsafe { ffi::glfwWindowHint(hint as i32, value) };
}

pub struct Window {
    window: NonNull<ffi::GLFWwindow>,
}

impl Window {
    pub fn create(width: i32, height: i32, title: &str) -> EyreResult<Self> {
        let as_c_str = CString::new(title)?;
        let window = unsafe {
            ffi::glfwCreateWindow(
                width,
                height,
                as_c_str.as_ptr(),
                ptr::null_mut(),
                ptr::null_mut(),
            )
        };

        if let Some(window) = NonNull::new(window) {
            Ok(Self { window })
        } else {
            Err(eyre!("Window creation failed: nullptr"))
        }
    }

    pub fn make_current(&self) {
        unsafe { ffi::glfwMakeContextCurrent(self.window.as_ptr()) };
    }

    pub fn get_framebuffer_size(&self) -> IVec2 {
        let mut result = IVec2::ZERO;
        unsafe { ffi::glfwGetFramebufferSize(self.window.as_ptr(), &mut result.x, &mut result.y) };
        result
    }
}
