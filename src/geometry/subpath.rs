use crate::foundation::core::Polyline;

/// Arc-length prefix of `path`.
///
/// Returns the leading portion of `path` whose planar length is
/// `fraction * path.planar_length()`. Parts that lie entirely before the cut are
/// copied verbatim, the part containing the cut is copied up to and including
/// the tail vertex, and later parts are dropped.
///
/// When the cut lands exactly on an existing vertex that vertex becomes the
/// tail; otherwise a new vertex is interpolated inside the crossing segment.
///
/// `fraction` is clamped to `[0, 1]` (NaN counts as 0). A fraction of 0 or a
/// path with zero length yields an empty polyline; a fraction of 1 yields the
/// input unchanged.
pub fn subpath(path: &Polyline, fraction: f64) -> Polyline {
    let fraction = if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    };

    let total = path.planar_length();
    if fraction == 0.0 || total <= 0.0 || !total.is_finite() {
        return Polyline::default();
    }
    if fraction == 1.0 {
        return path.clone();
    }

    let target = total * fraction;
    let mut consumed = 0.0;
    let mut out = Vec::with_capacity(path.paths.len());

    for part in &path.paths {
        for (i, seg) in part.windows(2).enumerate() {
            let gap = seg[0].distance(seg[1]);
            let reached = consumed + gap;

            if reached == target {
                out.push(part[..=i + 1].to_vec());
                return Polyline { paths: out };
            }
            if reached > target {
                let ratio = (target - consumed) / gap;
                let mut partial = part[..=i].to_vec();
                partial.push(seg[0].lerp(seg[1], ratio));
                out.push(partial);
                return Polyline { paths: out };
            }
            consumed = reached;
        }
        out.push(part.clone());
    }

    // Rounding left the target just past the accumulated total.
    Polyline { paths: out }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/subpath.rs"]
mod tests;
