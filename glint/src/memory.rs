//! GPU memory reporting through the vendor memory-info extensions.

use std::fmt;

use crate::context;
use crate::error::{checked, QueryError, QueryResult};
use gl::types::*;

const NVX_EXTENSION: &str = "GL_NVX_gpu_memory_info";
const ATI_EXTENSION: &str = "GL_ATI_meminfo";

// The gl crate only generates core + ARB enums; these come straight from
// the extension specs.
const GPU_MEMORY_INFO_DEDICATED_VIDMEM_NVX: GLenum = 0x9047;
const GPU_MEMORY_INFO_TOTAL_AVAILABLE_MEMORY_NVX: GLenum = 0x9048;
const GPU_MEMORY_INFO_CURRENT_AVAILABLE_VIDMEM_NVX: GLenum = 0x9049;
const GPU_MEMORY_INFO_EVICTION_COUNT_NVX: GLenum = 0x904A;
const GPU_MEMORY_INFO_EVICTED_MEMORY_NVX: GLenum = 0x904B;
const TEXTURE_FREE_MEMORY_ATI: GLenum = 0x87FC;

fn nvx_integer(pname: GLenum) -> QueryResult<GLint> {
    if !context::is_supported(NVX_EXTENSION)? {
        return Err(QueryError::ExtensionUnsupported(NVX_EXTENSION));
    }
    context::get_integer(pname)
}

/// Total video memory in KiB.
pub fn total_memory_kib() -> QueryResult<GLint> {
    nvx_integer(GPU_MEMORY_INFO_TOTAL_AVAILABLE_MEMORY_NVX)
}

/// Memory on the dedicated video card in KiB (excludes shared system
/// memory).
pub fn dedicated_memory_kib() -> QueryResult<GLint> {
    nvx_integer(GPU_MEMORY_INFO_DEDICATED_VIDMEM_NVX)
}

/// Currently free video memory in KiB. Prefers the NVIDIA query and
/// falls back to the ATI free-texture-memory report.
pub fn available_memory_kib() -> QueryResult<GLint> {
    if context::is_supported(NVX_EXTENSION)? {
        return context::get_integer(GPU_MEMORY_INFO_CURRENT_AVAILABLE_VIDMEM_NVX);
    }
    if context::is_supported(ATI_EXTENSION)? {
        // four ints: free, largest free block, free auxiliary, largest aux block
        let report = checked(|| {
            let mut values = [0; 4];
            unsafe { gl::GetIntegerv(TEXTURE_FREE_MEMORY_ATI, values.as_mut_ptr()) };
            values
        })?;
        return Ok(report[0]);
    }
    Err(QueryError::ExtensionUnsupported(NVX_EXTENSION))
}

pub fn eviction_count() -> QueryResult<GLint> {
    nvx_integer(GPU_MEMORY_INFO_EVICTION_COUNT_NVX)
}

pub fn evicted_memory_kib() -> QueryResult<GLint> {
    nvx_integer(GPU_MEMORY_INFO_EVICTED_MEMORY_NVX)
}

/// Snapshot of whatever the driver is willing to report; fields the
/// context cannot answer stay `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryInfo {
    pub total_kib: Option<GLint>,
    pub dedicated_kib: Option<GLint>,
    pub available_kib: Option<GLint>,
    pub eviction_count: Option<GLint>,
    pub evicted_kib: Option<GLint>,
}

impl MemoryInfo {
    pub fn gather() -> Self {
        Self {
            total_kib: total_memory_kib().ok(),
            dedicated_kib: dedicated_memory_kib().ok(),
            available_kib: available_memory_kib().ok(),
            eviction_count: eviction_count().ok(),
            evicted_kib: evicted_memory_kib().ok(),
        }
    }
}

fn write_mib(f: &mut fmt::Formatter<'_>, label: &str, kib: Option<GLint>) -> fmt::Result {
    match kib {
        Some(kib) => writeln!(f, "{label} {} MiB", kib / 1024),
        None => writeln!(f, "{label} not reported"),
    }
}

impl fmt::Display for MemoryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_mib(f, "total GPU memory:    ", self.total_kib)?;
        write_mib(f, "dedicated GPU memory:", self.dedicated_kib)?;
        write_mib(f, "available GPU memory:", self.available_kib)?;
        write_mib(f, "evicted GPU memory:  ", self.evicted_kib)?;
        match self.eviction_count {
            Some(count) => write!(f, "evictions:            {count}"),
            None => write!(f, "evictions:            not reported"),
        }
    }
}
