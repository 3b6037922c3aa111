//! The GLSL active-variable type table: names, shapes and byte sizes for
//! every type `glGetActiveUniform`/`glGetActiveAttrib` can report.

use gl::types::*;

/// Component type a variable is read back as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Float,
    Double,
    Int,
    UInt,
    /// Stored and transferred as a 32-bit integer.
    Bool,
}

impl ScalarKind {
    pub const fn byte_size(self) -> u32 {
        match self {
            Self::Double => 8,
            Self::Float | Self::Int | Self::UInt | Self::Bool => 4,
        }
    }
}

macro_rules! glsl_types {
    ( $( $variant:ident = $gl:ident ($name:literal, $scalar:ident, $cols:literal x $rows:literal) ),* $(,)? ) => {
        /// A type as reported for an active attribute or uniform.
        ///
        /// `matCxR` has C columns of R components; vectors are a single
        /// row; opaque types (samplers, images, counters) are a lone
        /// integer handle.
        #[repr(u32)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum GlslType {
            $( $variant = gl::$gl, )*
        }

        impl GlslType {
            pub fn from_raw(raw: GLenum) -> Option<Self> {
                match raw {
                    $( gl::$gl => Some(Self::$variant), )*
                    _ => None,
                }
            }

            /// The GLSL keyword.
            pub const fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $name, )*
                }
            }

            pub const fn scalar(self) -> ScalarKind {
                match self {
                    $( Self::$variant => ScalarKind::$scalar, )*
                }
            }

            pub const fn columns(self) -> u32 {
                match self {
                    $( Self::$variant => $cols, )*
                }
            }

            pub const fn rows(self) -> u32 {
                match self {
                    $( Self::$variant => $rows, )*
                }
            }
        }
    };
}

glsl_types! {
    // scalars and vectors
    Float = FLOAT ("float", Float, 1 x 1),
    FloatVec2 = FLOAT_VEC2 ("vec2", Float, 2 x 1),
    FloatVec3 = FLOAT_VEC3 ("vec3", Float, 3 x 1),
    FloatVec4 = FLOAT_VEC4 ("vec4", Float, 4 x 1),
    Double = DOUBLE ("double", Double, 1 x 1),
    DoubleVec2 = DOUBLE_VEC2 ("dvec2", Double, 2 x 1),
    DoubleVec3 = DOUBLE_VEC3 ("dvec3", Double, 3 x 1),
    DoubleVec4 = DOUBLE_VEC4 ("dvec4", Double, 4 x 1),
    Int = INT ("int", Int, 1 x 1),
    IntVec2 = INT_VEC2 ("ivec2", Int, 2 x 1),
    IntVec3 = INT_VEC3 ("ivec3", Int, 3 x 1),
    IntVec4 = INT_VEC4 ("ivec4", Int, 4 x 1),
    UInt = UNSIGNED_INT ("uint", UInt, 1 x 1),
    UIntVec2 = UNSIGNED_INT_VEC2 ("uvec2", UInt, 2 x 1),
    UIntVec3 = UNSIGNED_INT_VEC3 ("uvec3", UInt, 3 x 1),
    UIntVec4 = UNSIGNED_INT_VEC4 ("uvec4", UInt, 4 x 1),
    Bool = BOOL ("bool", Bool, 1 x 1),
    BoolVec2 = BOOL_VEC2 ("bvec2", Bool, 2 x 1),
    BoolVec3 = BOOL_VEC3 ("bvec3", Bool, 3 x 1),
    BoolVec4 = BOOL_VEC4 ("bvec4", Bool, 4 x 1),

    // float matrices
    Mat2 = FLOAT_MAT2 ("mat2", Float, 2 x 2),
    Mat3 = FLOAT_MAT3 ("mat3", Float, 3 x 3),
    Mat4 = FLOAT_MAT4 ("mat4", Float, 4 x 4),
    Mat2x3 = FLOAT_MAT2x3 ("mat2x3", Float, 2 x 3),
    Mat2x4 = FLOAT_MAT2x4 ("mat2x4", Float, 2 x 4),
    Mat3x2 = FLOAT_MAT3x2 ("mat3x2", Float, 3 x 2),
    Mat3x4 = FLOAT_MAT3x4 ("mat3x4", Float, 3 x 4),
    Mat4x2 = FLOAT_MAT4x2 ("mat4x2", Float, 4 x 2),
    Mat4x3 = FLOAT_MAT4x3 ("mat4x3", Float, 4 x 3),

    // double matrices
    DMat2 = DOUBLE_MAT2 ("dmat2", Double, 2 x 2),
    DMat3 = DOUBLE_MAT3 ("dmat3", Double, 3 x 3),
    DMat4 = DOUBLE_MAT4 ("dmat4", Double, 4 x 4),
    DMat2x3 = DOUBLE_MAT2x3 ("dmat2x3", Double, 2 x 3),
    DMat2x4 = DOUBLE_MAT2x4 ("dmat2x4", Double, 2 x 4),
    DMat3x2 = DOUBLE_MAT3x2 ("dmat3x2", Double, 3 x 2),
    DMat3x4 = DOUBLE_MAT3x4 ("dmat3x4", Double, 3 x 4),
    DMat4x2 = DOUBLE_MAT4x2 ("dmat4x2", Double, 4 x 2),
    DMat4x3 = DOUBLE_MAT4x3 ("dmat4x3", Double, 4 x 3),

    // float samplers
    Sampler1D = SAMPLER_1D ("sampler1D", Int, 1 x 1),
    Sampler2D = SAMPLER_2D ("sampler2D", Int, 1 x 1),
    Sampler3D = SAMPLER_3D ("sampler3D", Int, 1 x 1),
    SamplerCube = SAMPLER_CUBE ("samplerCube", Int, 1 x 1),
    Sampler1DShadow = SAMPLER_1D_SHADOW ("sampler1DShadow", Int, 1 x 1),
    Sampler2DShadow = SAMPLER_2D_SHADOW ("sampler2DShadow", Int, 1 x 1),
    Sampler1DArray = SAMPLER_1D_ARRAY ("sampler1DArray", Int, 1 x 1),
    Sampler2DArray = SAMPLER_2D_ARRAY ("sampler2DArray", Int, 1 x 1),
    Sampler1DArrayShadow = SAMPLER_1D_ARRAY_SHADOW ("sampler1DArrayShadow", Int, 1 x 1),
    Sampler2DArrayShadow = SAMPLER_2D_ARRAY_SHADOW ("sampler2DArrayShadow", Int, 1 x 1),
    Sampler2DMultisample = SAMPLER_2D_MULTISAMPLE ("sampler2DMS", Int, 1 x 1),
    Sampler2DMultisampleArray = SAMPLER_2D_MULTISAMPLE_ARRAY ("sampler2DMSArray", Int, 1 x 1),
    SamplerCubeShadow = SAMPLER_CUBE_SHADOW ("samplerCubeShadow", Int, 1 x 1),
    SamplerCubeArray = SAMPLER_CUBE_MAP_ARRAY ("samplerCubeArray", Int, 1 x 1),
    SamplerCubeArrayShadow = SAMPLER_CUBE_MAP_ARRAY_SHADOW ("samplerCubeArrayShadow", Int, 1 x 1),
    SamplerBuffer = SAMPLER_BUFFER ("samplerBuffer", Int, 1 x 1),
    Sampler2DRect = SAMPLER_2D_RECT ("sampler2DRect", Int, 1 x 1),
    Sampler2DRectShadow = SAMPLER_2D_RECT_SHADOW ("sampler2DRectShadow", Int, 1 x 1),

    // int samplers
    IntSampler1D = INT_SAMPLER_1D ("isampler1D", Int, 1 x 1),
    IntSampler2D = INT_SAMPLER_2D ("isampler2D", Int, 1 x 1),
    IntSampler3D = INT_SAMPLER_3D ("isampler3D", Int, 1 x 1),
    IntSamplerCube = INT_SAMPLER_CUBE ("isamplerCube", Int, 1 x 1),
    IntSampler1DArray = INT_SAMPLER_1D_ARRAY ("isampler1DArray", Int, 1 x 1),
    IntSampler2DArray = INT_SAMPLER_2D_ARRAY ("isampler2DArray", Int, 1 x 1),
    IntSamplerCubeArray = INT_SAMPLER_CUBE_MAP_ARRAY ("isamplerCubeArray", Int, 1 x 1),
    IntSampler2DMultisample = INT_SAMPLER_2D_MULTISAMPLE ("isampler2DMS", Int, 1 x 1),
    IntSampler2DMultisampleArray = INT_SAMPLER_2D_MULTISAMPLE_ARRAY ("isampler2DMSArray", Int, 1 x 1),
    IntSamplerBuffer = INT_SAMPLER_BUFFER ("isamplerBuffer", Int, 1 x 1),
    IntSampler2DRect = INT_SAMPLER_2D_RECT ("isampler2DRect", Int, 1 x 1),

    // unsigned int samplers
    UIntSampler1D = UNSIGNED_INT_SAMPLER_1D ("usampler1D", Int, 1 x 1),
    UIntSampler2D = UNSIGNED_INT_SAMPLER_2D ("usampler2D", Int, 1 x 1),
    UIntSampler3D = UNSIGNED_INT_SAMPLER_3D ("usampler3D", Int, 1 x 1),
    UIntSamplerCube = UNSIGNED_INT_SAMPLER_CUBE ("usamplerCube", Int, 1 x 1),
    UIntSampler1DArray = UNSIGNED_INT_SAMPLER_1D_ARRAY ("usampler1DArray", Int, 1 x 1),
    UIntSampler2DArray = UNSIGNED_INT_SAMPLER_2D_ARRAY ("usampler2DArray", Int, 1 x 1),
    UIntSamplerCubeArray = UNSIGNED_INT_SAMPLER_CUBE_MAP_ARRAY ("usamplerCubeArray", Int, 1 x 1),
    UIntSampler2DMultisample = UNSIGNED_INT_SAMPLER_2D_MULTISAMPLE ("usampler2DMS", Int, 1 x 1),
    UIntSampler2DMultisampleArray = UNSIGNED_INT_SAMPLER_2D_MULTISAMPLE_ARRAY ("usampler2DMSArray", Int, 1 x 1),
    UIntSamplerBuffer = UNSIGNED_INT_SAMPLER_BUFFER ("usamplerBuffer", Int, 1 x 1),
    UIntSampler2DRect = UNSIGNED_INT_SAMPLER_2D_RECT ("usampler2DRect", Int, 1 x 1),

    // images
    Image1D = IMAGE_1D ("image1D", Int, 1 x 1),
    Image2D = IMAGE_2D ("image2D", Int, 1 x 1),
    Image3D = IMAGE_3D ("image3D", Int, 1 x 1),
    Image2DRect = IMAGE_2D_RECT ("image2DRect", Int, 1 x 1),
    ImageCube = IMAGE_CUBE ("imageCube", Int, 1 x 1),
    ImageBuffer = IMAGE_BUFFER ("imageBuffer", Int, 1 x 1),
    Image1DArray = IMAGE_1D_ARRAY ("image1DArray", Int, 1 x 1),
    Image2DArray = IMAGE_2D_ARRAY ("image2DArray", Int, 1 x 1),
    ImageCubeArray = IMAGE_CUBE_MAP_ARRAY ("imageCubeArray", Int, 1 x 1),
    Image2DMultisample = IMAGE_2D_MULTISAMPLE ("image2DMS", Int, 1 x 1),
    Image2DMultisampleArray = IMAGE_2D_MULTISAMPLE_ARRAY ("image2DMSArray", Int, 1 x 1),
    IntImage1D = INT_IMAGE_1D ("iimage1D", Int, 1 x 1),
    IntImage2D = INT_IMAGE_2D ("iimage2D", Int, 1 x 1),
    IntImage3D = INT_IMAGE_3D ("iimage3D", Int, 1 x 1),
    IntImage2DRect = INT_IMAGE_2D_RECT ("iimage2DRect", Int, 1 x 1),
    IntImageCube = INT_IMAGE_CUBE ("iimageCube", Int, 1 x 1),
    IntImageBuffer = INT_IMAGE_BUFFER ("iimageBuffer", Int, 1 x 1),
    IntImage1DArray = INT_IMAGE_1D_ARRAY ("iimage1DArray", Int, 1 x 1),
    IntImage2DArray = INT_IMAGE_2D_ARRAY ("iimage2DArray", Int, 1 x 1),
    IntImageCubeArray = INT_IMAGE_CUBE_MAP_ARRAY ("iimageCubeArray", Int, 1 x 1),
    IntImage2DMultisample = INT_IMAGE_2D_MULTISAMPLE ("iimage2DMS", Int, 1 x 1),
    IntImage2DMultisampleArray = INT_IMAGE_2D_MULTISAMPLE_ARRAY ("iimage2DMSArray", Int, 1 x 1),
    UIntImage1D = UNSIGNED_INT_IMAGE_1D ("uimage1D", Int, 1 x 1),
    UIntImage2D = UNSIGNED_INT_IMAGE_2D ("uimage2D", Int, 1 x 1),
    UIntImage3D = UNSIGNED_INT_IMAGE_3D ("uimage3D", Int, 1 x 1),
    UIntImage2DRect = UNSIGNED_INT_IMAGE_2D_RECT ("uimage2DRect", Int, 1 x 1),
    UIntImageCube = UNSIGNED_INT_IMAGE_CUBE ("uimageCube", Int, 1 x 1),
    UIntImageBuffer = UNSIGNED_INT_IMAGE_BUFFER ("uimageBuffer", Int, 1 x 1),
    UIntImage1DArray = UNSIGNED_INT_IMAGE_1D_ARRAY ("uimage1DArray", Int, 1 x 1),
    UIntImage2DArray = UNSIGNED_INT_IMAGE_2D_ARRAY ("uimage2DArray", Int, 1 x 1),
    UIntImageCubeArray = UNSIGNED_INT_IMAGE_CUBE_MAP_ARRAY ("uimageCubeArray", Int, 1 x 1),
    UIntImage2DMultisample = UNSIGNED_INT_IMAGE_2D_MULTISAMPLE ("uimage2DMS", Int, 1 x 1),
    UIntImage2DMultisampleArray = UNSIGNED_INT_IMAGE_2D_MULTISAMPLE_ARRAY ("uimage2DMSArray", Int, 1 x 1),

    AtomicUInt = UNSIGNED_INT_ATOMIC_COUNTER ("atomic_uint", UInt, 1 x 1),
}

impl GlslType {
    pub const fn to_u32(self) -> u32 {
        self as u32
    }

    pub const fn component_count(self) -> u32 {
        self.columns() * self.rows()
    }

    /// Tightly packed size of one value of this type.
    pub const fn byte_size(self) -> u32 {
        self.component_count() * self.scalar().byte_size()
    }

    pub const fn is_matrix(self) -> bool {
        self.rows() > 1
    }

    /// Bytes a uniform of this type occupies inside a uniform block,
    /// given the strides the driver reported for it. The array stride
    /// already accounts for matrix layout; a bare matrix spans one
    /// stride per column.
    pub const fn block_member_size(
        self,
        array_size: GLint,
        array_stride: GLint,
        matrix_stride: GLint,
    ) -> GLint {
        if array_stride > 0 {
            let count = if array_size > 1 { array_size } else { 1 };
            array_stride * count
        } else if matrix_stride > 0 {
            self.columns() as GLint * matrix_stride
        } else {
            self.byte_size() as GLint
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes() {
        assert_eq!(GlslType::Float.component_count(), 1);
        assert_eq!(GlslType::FloatVec3.component_count(), 3);
        assert_eq!(GlslType::Mat4.component_count(), 16);
        // mat2x3: 2 columns of 3 rows
        assert_eq!(GlslType::Mat2x3.columns(), 2);
        assert_eq!(GlslType::Mat2x3.rows(), 3);
        assert_eq!(GlslType::Mat2x3.component_count(), 6);
    }

    #[test]
    fn packed_sizes() {
        assert_eq!(GlslType::FloatVec4.byte_size(), 16);
        assert_eq!(GlslType::DoubleVec2.byte_size(), 16);
        assert_eq!(GlslType::Mat4.byte_size(), 64);
        assert_eq!(GlslType::DMat2.byte_size(), 32);
        assert_eq!(GlslType::BoolVec3.byte_size(), 12);
        assert_eq!(GlslType::Sampler2D.byte_size(), 4);
    }

    #[test]
    fn raw_round_trip() {
        assert_eq!(GlslType::from_raw(gl::FLOAT_MAT3), Some(GlslType::Mat3));
        assert_eq!(GlslType::Mat3.to_u32(), gl::FLOAT_MAT3);
        assert_eq!(GlslType::from_raw(gl::FLOAT_MAT3).unwrap().name(), "mat3");
        assert_eq!(GlslType::from_raw(0), None);
    }

    #[test]
    fn block_member_scalar() {
        // a lone float inside a block: no strides reported
        assert_eq!(GlslType::Float.block_member_size(1, 0, 0), 4);
    }

    #[test]
    fn block_member_array() {
        // std140 pads float array elements out to 16 bytes
        assert_eq!(GlslType::Float.block_member_size(3, 16, 0), 48);
        // driver reports -1 array stride for non-arrays
        assert_eq!(GlslType::FloatVec4.block_member_size(1, -1, -1), 16);
    }

    #[test]
    fn block_member_matrix() {
        // mat4: four columns, 16-byte column stride
        assert_eq!(GlslType::Mat4.block_member_size(1, 0, 16), 64);
        // mat2x3 under std140: 2 columns padded to vec4
        assert_eq!(GlslType::Mat2x3.block_member_size(1, 0, 16), 32);
        // array of mat4: array stride wins
        assert_eq!(GlslType::Mat4.block_member_size(2, 64, 16), 128);
    }
}
