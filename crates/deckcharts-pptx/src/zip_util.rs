use std::io::Read;

use crate::PptxError;

/// Largest single part inflated into memory.
pub(crate) const DEFAULT_MAX_PART_BYTES: u64 = 256 * 1024 * 1024; // 256MiB

/// Largest total inflated size across all parts of one package.
pub(crate) const DEFAULT_MAX_TOTAL_BYTES: u64 = 512 * 1024 * 1024; // 512MiB

/// Running total of bytes inflated while loading one package.
#[derive(Debug, Clone)]
pub(crate) struct InflateBudget {
    max_total_bytes: u64,
    used_bytes: u64,
}

impl InflateBudget {
    pub(crate) fn new(max_total_bytes: u64) -> Self {
        Self {
            max_total_bytes,
            used_bytes: 0,
        }
    }

    pub(crate) fn remaining_bytes(&self) -> u64 {
        self.max_total_bytes.saturating_sub(self.used_bytes)
    }

    fn consume(&mut self, bytes: u64) -> Result<(), PptxError> {
        self.used_bytes = self.used_bytes.saturating_add(bytes);
        if self.used_bytes > self.max_total_bytes {
            return Err(PptxError::PackageTooLarge {
                total: self.used_bytes,
                max: self.max_total_bytes,
            });
        }
        Ok(())
    }
}

/// Read one zip entry into memory.
///
/// `declared_size` is the entry's uncompressed size from the central directory. It is used to
/// reject oversized parts early but is not trusted: the read itself is capped at the effective
/// limit + 1 so forged metadata cannot inflate past the limits.
pub(crate) fn read_part_with_budget<R: Read>(
    reader: R,
    part: &str,
    declared_size: u64,
    max_part_bytes: u64,
    budget: &mut InflateBudget,
) -> Result<Vec<u8>, PptxError> {
    if declared_size > max_part_bytes {
        return Err(PptxError::PartTooLarge {
            part: part.to_string(),
            size: declared_size,
            max: max_part_bytes,
        });
    }

    let remaining = budget.remaining_bytes();
    let effective_max = max_part_bytes.min(remaining);
    let limit_is_total = effective_max < max_part_bytes;
    if limit_is_total && declared_size > effective_max {
        return Err(PptxError::PackageTooLarge {
            total: budget.used_bytes.saturating_add(declared_size),
            max: budget.max_total_bytes,
        });
    }

    let mut buf = Vec::new();
    reader
        .take(effective_max.saturating_add(1))
        .read_to_end(&mut buf)?;

    let observed = buf.len() as u64;
    if observed > effective_max && !limit_is_total {
        return Err(PptxError::PartTooLarge {
            part: part.to_string(),
            size: observed,
            max: max_part_bytes,
        });
    }
    budget.consume(observed)?;
    Ok(buf)
}
