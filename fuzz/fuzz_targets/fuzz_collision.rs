//! Fuzz target for bounding-box collision.
//!
//! Goal: `find_collisions` should **never panic**, whatever the coordinates
//! (including NaN and infinities), and never report an element against
//! itself.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_collision
//! ```

#![no_main]

use arbitrary::Arbitrary;
use bimqa_domain::geometry::{CollisionParams, find_collisions};
use bimqa_domain::model::{BoundingBox, ElementId, Xyz};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    sensitivity: f64,
    boxes: Vec<(i64, Option<[f64; 6]>)>,
}

fuzz_target!(|input: Input| {
    let candidates = input.boxes.into_iter().take(64).map(|(id, coords)| {
        let bb = coords.map(|[x0, y0, z0, x1, y1, z1]| {
            BoundingBox::new(Xyz::new(x0, y0, z0), Xyz::new(x1, y1, z1))
        });
        (ElementId(id), bb)
    });
    let result = find_collisions(candidates, &CollisionParams::with_sensitivity(input.sensitivity));
    for (a, b) in &result.pairs {
        assert_ne!(a, b);
    }
});
