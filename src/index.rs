//! Conversions between the 3D and flat (row-major) indices of voxels and
//! detector pixels. The last axis varies fastest.

#[allow(non_camel_case_types)] pub type Index1_u = usize;
#[allow(non_camel_case_types)] pub type Index3_u = [usize; 3];
#[allow(non_camel_case_types)] pub type BoxDim_u = [usize; 3];

#[inline]
pub fn index3_to_1([i0, i1, i2]: Index3_u, [_, n1, n2]: BoxDim_u) -> Index1_u {
    (i0 * n1 + i1) * n2 + i2
}

#[inline]
#[allow(clippy::many_single_char_names)]
pub fn index1_to_3(i: Index1_u, [_, n1, n2]: BoxDim_u) -> Index3_u {
    let i2 = i % n2;
    let r  = i / n2;
    let i1 = r % n1;
    let i0 = r / n1;
    [i0, i1, i2]
}
