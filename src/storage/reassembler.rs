use std::collections::BTreeMap;

use super::stream::Writer;

/// Reassembles indexed substrings into their original stream.
///
/// Substrings arrive keyed by the stream index of their first byte, possibly
/// out of order and overlapping. Whatever extends the contiguous prefix is
/// written into the output stream immediately; the rest is parked in an
/// ordered map, merged with neighbors it overlaps or touches, until the gap
/// before it fills in.
///
/// Storage is bounded by the output stream: bytes past
/// `next index + writer.available_capacity()` are dropped on arrival and
/// must be retransmitted by the peer. Within that window stored segments
/// stay pairwise disjoint and non-adjacent.
#[derive(Debug, Default)]
pub struct Reassembler {
    /// Parked substrings, keyed by the stream index of their first byte.
    segments: BTreeMap<u64, Vec<u8>>,
    /// Index of the next byte to hand to the output stream.
    next_index: u64,
    /// Total stream length, once the final substring has been seen.
    end_index: Option<u64>,
}

impl Reassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept the substring of the stream starting at `first_index`.
    ///
    /// `is_last` marks the substring containing the final byte; the output
    /// stream is closed once everything up to that byte has been written.
    pub fn insert(&mut self, first_index: u64, data: &[u8], is_last: bool, writer: &mut Writer<'_>) {
        if is_last {
            self.end_index = Some(first_index + data.len() as u64);
        }

        // Clip to the window the output can still absorb; bytes beyond it
        // are dropped for good.
        let window_end = self.next_index + writer.available_capacity() as u64;
        let start = first_index.max(self.next_index);
        let end = (first_index + data.len() as u64).min(window_end);

        if start < end {
            let usable = &data[(start - first_index) as usize..(end - first_index) as usize];
            self.merge(start, usable, writer);
        }

        self.close_if_done(writer);
    }

    /// Bytes parked in the reassembler, waiting for a gap to fill.
    pub fn bytes_pending(&self) -> u64 {
        self.segments.values().map(|segment| segment.len() as u64).sum()
    }

    fn merge(&mut self, start: u64, data: &[u8], writer: &mut Writer<'_>) {
        let mut merged_start = start;
        let mut merged_end = start + data.len() as u64;

        // A left neighbor is absorbed when it overlaps or touches the new
        // range. Since stored segments are disjoint at most one qualifies.
        if let Some((&left_start, left)) = self.segments.range(..start).next_back() {
            if left_start + left.len() as u64 >= start {
                merged_start = left_start;
            }
        }

        // Every stored segment starting inside the (extended) range overlaps
        // or touches it; the last one may stick out past the end.
        let absorbed: Vec<u64> = self.segments
            .range(merged_start..=merged_end)
            .map(|(&segment_start, _)| segment_start)
            .collect();
        for &segment_start in &absorbed {
            let segment_end = segment_start + self.segments[&segment_start].len() as u64;
            merged_end = merged_end.max(segment_end);
        }

        let mut merged = vec![0u8; (merged_end - merged_start) as usize];
        let offset = (start - merged_start) as usize;
        merged[offset..offset + data.len()].copy_from_slice(data);
        // Stored bytes win where ranges overlap; a well-behaved peer sends
        // identical bytes either way.
        for segment_start in absorbed {
            let segment = self.segments.remove(&segment_start).unwrap();
            let offset = (segment_start - merged_start) as usize;
            merged[offset..offset + segment.len()].copy_from_slice(&segment);
        }

        if merged_start == self.next_index {
            // The merged range fits the output window by construction, so
            // the push is never truncated.
            let pushed = writer.push(&merged);
            self.next_index += pushed as u64;
            self.drain_contiguous(writer);
        } else {
            self.segments.insert(merged_start, merged);
        }
    }

    fn drain_contiguous(&mut self, writer: &mut Writer<'_>) {
        while let Some(&segment_start) = self.segments.keys().next() {
            if segment_start != self.next_index {
                break;
            }
            let segment = self.segments.remove(&segment_start).unwrap();
            writer.push(&segment);
            self.next_index += segment.len() as u64;
        }
    }

    fn close_if_done(&mut self, writer: &mut Writer<'_>) {
        if let Some(end_index) = self.end_index {
            if self.next_index >= end_index {
                writer.close();
            }
        }
    }
}
