//! Host model as seen by QA modules.
//!
//! These are plain data types; access to a live model goes through
//! [`Document`](crate::Document).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Div, Sub};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct ElementId(pub i64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Xyz {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Xyz {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance_to(self, other: Xyz) -> f64 {
        (other - self).length()
    }
}

impl Add for Xyz {
    type Output = Xyz;
    fn add(self, o: Xyz) -> Xyz {
        Xyz::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }
}

impl Sub for Xyz {
    type Output = Xyz;
    fn sub(self, o: Xyz) -> Xyz {
        Xyz::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }
}

impl Div<f64> for Xyz {
    type Output = Xyz;
    fn div(self, d: f64) -> Xyz {
        Xyz::new(self.x / d, self.y / d, self.z / d)
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BoundingBox {
    pub min: Xyz,
    pub max: Xyz,
}

impl BoundingBox {
    pub fn new(min: Xyz, max: Xyz) -> Self {
        Self { min, max }
    }

    /// Box of `width` x `height` (x/y) centred on `center`, zero depth.
    pub fn around(center: Xyz, width: f64, height: f64) -> Self {
        let half = Xyz::new(width / 2.0, height / 2.0, 0.0);
        Self::new(center - half, center + half)
    }

    pub fn point(p: Xyz) -> Self {
        Self::new(p, p)
    }

    pub fn center(&self) -> Xyz {
        (self.min + self.max) / 2.0
    }

    pub fn diagonal(&self) -> f64 {
        self.min.distance_to(self.max)
    }

    pub fn half_diagonal(&self) -> f64 {
        self.diagonal() / 2.0
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn is_scale_valid(factor: f64) -> bool {
        factor.is_finite() && factor > 0.0
    }

    /// Scale about the centre. Invalid factors leave the box unchanged.
    pub fn scaled(&self, factor: f64) -> BoundingBox {
        if !Self::is_scale_valid(factor) {
            return *self;
        }
        let c = self.center();
        let half = (self.max - self.min) / 2.0;
        let half = Xyz::new(half.x * factor, half.y * factor, half.z * factor);
        BoundingBox::new(c - half, c + half)
    }

    /// Overlap test on all three axes, widened by `tolerance`.
    pub fn intersects(&self, other: &BoundingBox, tolerance: f64) -> bool {
        self.min.x <= other.max.x + tolerance
            && other.min.x <= self.max.x + tolerance
            && self.min.y <= other.max.y + tolerance
            && other.min.y <= self.max.y + tolerance
            && self.min.z <= other.max.z + tolerance
            && other.min.z <= self.max.z + tolerance
    }

    /// Inclusive containment of `p` on all three axes.
    pub fn contains(&self, p: Xyz) -> bool {
        (self.min.x..=self.max.x).contains(&p.x)
            && (self.min.y..=self.max.y).contains(&p.y)
            && (self.min.z..=self.max.z).contains(&p.z)
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            Xyz::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            Xyz::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        )
    }

    /// Same x/y extent with z forced to `[z_min, z_max]`.
    pub fn flattened(&self, z_min: f64, z_max: f64) -> BoundingBox {
        BoundingBox::new(
            Xyz::new(self.min.x, self.min.y, z_min),
            Xyz::new(self.max.x, self.max.y, z_max),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Model,
    Annotation,
    Analytical,
    Internal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub kind: CategoryKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ViewType {
    FloorPlan,
    CeilingPlan,
    Section,
    Elevation,
    ThreeD,
    Drafting,
    Legend,
    Schedule,
    Sheet,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TagClass {
    Element,
    Room,
    Space,
    Area,
}

impl TagClass {
    pub fn is_spatial(self) -> bool {
        !matches!(self, TagClass::Element)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ViewFacet {
    pub view_type: ViewType,
    #[serde(default)]
    pub is_template: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TagFacet {
    #[serde(default = "element_tag")]
    pub tag_class: TagClass,
    #[serde(default)]
    pub tagged: Vec<ElementId>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_orphaned: bool,
    #[serde(default)]
    pub has_leader: bool,
    /// Centre of the tag head.
    pub head: Xyz,
    pub head_width: f64,
    pub head_height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader_end: Option<Xyz>,
}

fn element_tag() -> TagClass {
    TagClass::Element
}

impl TagFacet {
    pub fn head_box(&self) -> BoundingBox {
        BoundingBox::around(self.head, self.head_width, self.head_height)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CurveFacet {
    pub start: Xyz,
    pub end: Xyz,
}

impl CurveFacet {
    /// Angle between the curve and the vertical axis, in degrees.
    pub fn angle_from_vertical(&self) -> f64 {
        let d = self.end - self.start;
        let len = d.length();
        if len == 0.0 {
            return 90.0;
        }
        (d.z.abs() / len).clamp(-1.0, 1.0).acos().to_degrees()
    }

    pub fn is_level(&self) -> bool {
        self.end.z == self.start.z
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Facet {
    #[default]
    Generic,
    View(ViewFacet),
    Tag(TagFacet),
    Curve(CurveFacet),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Element {
    pub id: ElementId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Category name; `None` for elements without a category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    /// View that owns this element (view-specific elements such as tags).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_view: Option<ElementId>,
    /// Views in which the element appears.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub views: Vec<ElementId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hidden_in_views: Vec<ElementId>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    /// Insertion point of point-based family instances.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Xyz>,
    #[serde(default)]
    pub facet: Facet,
}

impl Element {
    pub fn new(id: i64) -> Self {
        Self {
            id: ElementId(id),
            name: None,
            category: None,
            family: None,
            owner_view: None,
            views: Vec::new(),
            hidden_in_views: Vec::new(),
            parameters: BTreeMap::new(),
            bounding_box: None,
            location: None,
            facet: Facet::Generic,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }

    pub fn category_name(&self) -> &str {
        self.category.as_deref().unwrap_or("Unknown")
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    /// Insertion point, falling back to the bounding box centre.
    pub fn location_point(&self) -> Option<Xyz> {
        self.location.or_else(|| self.bounding_box.map(|bb| bb.center()))
    }

    pub fn as_view(&self) -> Option<&ViewFacet> {
        match &self.facet {
            Facet::View(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> Option<&TagFacet> {
        match &self.facet {
            Facet::Tag(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_tag_mut(&mut self) -> Option<&mut TagFacet> {
        match &mut self.facet {
            Facet::Tag(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_curve(&self) -> Option<&CurveFacet> {
        match &self.facet {
            Facet::Curve(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_view(&self) -> bool {
        self.as_view().is_some()
    }

    pub fn is_3d_view(&self) -> bool {
        self.as_view()
            .is_some_and(|v| v.view_type == ViewType::ThreeD)
    }
}
