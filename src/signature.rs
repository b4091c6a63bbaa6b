//! Signature extraction (§4.B): turn an allele matrix into fixed-width
//! per-individual, per-window signatures.

/// Number of complete, non-overlapping windows of `block_size` loci that fit
/// in `locus_len`. Trailing alleles shorter than `block_size` are discarded.
#[inline]
pub fn num_windows(locus_len: usize, block_size: usize) -> usize {
    locus_len / block_size
}

/// The signature at window `w` for one individual: the slice of alleles
/// `individual[w*block_size .. (w+1)*block_size]`.
#[inline]
pub fn signature(individual: &[i64], window: usize, block_size: usize) -> &[i64] {
    let start = window * block_size;
    &individual[start..start + block_size]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn num_windows_discards_remainder() {
        assert_eq!(num_windows(65, 20), 3);
        assert_eq!(num_windows(60, 20), 3);
        assert_eq!(num_windows(19, 20), 0);
    }

    #[test]
    fn signature_slices_contiguous_block() {
        let individual: Vec<i64> = (0..60).collect();
        assert_eq!(signature(&individual, 0, 20), &individual[0..20]);
        assert_eq!(signature(&individual, 2, 20), &individual[40..60]);
    }
}
