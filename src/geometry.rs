//! Shape catalog and likeness scoring
//!
//! Each candidate output character is described by an ideal pixel-coverage
//! shape. Polygon shapes are defined in the unit square and rasterized once
//! per section size; scoring a section then only needs a containment test
//! per lit pixel.

/// Character used for sections with no lit pixels.
pub const EMPTY_CHARACTER: char = ' ';

/// Character used for fully lit sections.
pub const FILLED_CHARACTER: char = '$';

/// Lit-pixel coordinate, 1-indexed relative to the section's top-left
/// corner: the top-left pixel is (1, 1).
pub type Coord = (u32, u32);

/// Polygon definitions for the fixed catalog, as (character, vertices)
/// with vertices in the unit square. Order matters: cheap/likely matches
/// come first so the early-exit scan in `ShapeCatalog::choose` usually
/// stops after a few shapes.
const POLYGON_DEFINITIONS: &[(char, &[(f32, f32)])] = &[
    ('o', &[(0.0, 0.5), (1.0, 0.5), (1.0, 1.0), (0.0, 1.0)]),
    ('*', &[(0.0, 0.0), (1.0, 0.0), (1.0, 0.5), (0.0, 0.5)]),
    ('.', &[(0.0, 0.7), (1.0, 0.7), (1.0, 1.0), (0.0, 1.0)]),
    ('°', &[(0.0, 0.0), (1.0, 0.0), (1.0, 0.3), (0.0, 0.3)]),
    ('b', &[(0.0, 0.0), (1.0, 1.0), (0.0, 1.0)]),
    ('d', &[(1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]),
    ('P', &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]),
    ('?', &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]),
];

/// Even-odd ray-casting containment test.
///
/// All catalog polygons have at most 4 vertices, so a plain scan beats
/// pulling in a geometry library.
fn polygon_contains(vertices: &[(f32, f32)], px: f32, py: f32) -> bool {
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (xi, yi) = vertices[i];
        let (xj, yj) = vertices[j];
        if (yi > py) != (yj > py) {
            let x_cross = xi + (py - yi) / (yj - yi) * (xj - xi);
            if px < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// A polygon shape rasterized for a specific section size.
#[derive(Debug, Clone)]
pub struct PolygonShape {
    character: char,
    /// Vertices scaled from the unit square to section-pixel space.
    vertices: Vec<(f32, f32)>,
    width: u32,
    height: u32,
    /// Grid points enclosed by the polygon.
    filled_area: u32,
    /// Grid points outside the polygon.
    unfilled_area: u32,
}

impl PolygonShape {
    pub fn new(character: char, points: &[(f32, f32)], width: u32, height: u32) -> Self {
        let vertices: Vec<(f32, f32)> = points
            .iter()
            .map(|&(x, y)| (x * width as f32, y * height as f32))
            .collect();

        let mut filled_area = 0;
        for y in 0..height {
            for x in 0..width {
                if polygon_contains(&vertices, (x + 1) as f32, (y + 1) as f32) {
                    filled_area += 1;
                }
            }
        }

        Self {
            character,
            vertices,
            width,
            height,
            filled_area,
            unfilled_area: width * height - filled_area,
        }
    }

    fn contains(&self, coord: Coord) -> bool {
        polygon_contains(&self.vertices, coord.0 as f32, coord.1 as f32)
    }
}

/// A candidate output character plus its ideal pixel coverage.
///
/// The fully empty and fully filled cases need no polygon test, so they
/// get their own variants.
#[derive(Debug, Clone)]
pub enum Shape {
    Empty { character: char, box_area: u32 },
    Filled { character: char, box_area: u32 },
    Polygon(PolygonShape),
}

impl Shape {
    pub fn character(&self) -> char {
        match self {
            Shape::Empty { character, .. } => *character,
            Shape::Filled { character, .. } => *character,
            Shape::Polygon(polygon) => polygon.character,
        }
    }

    /// Score how well a section's lit pixels match this shape, from 0.0
    /// (nothing conforms) to 1.0 (perfect match).
    ///
    /// A pixel conforms when it is lit inside the shape or unlit outside
    /// it, so correctly-dark background counts as much as correctly-lit
    /// foreground.
    ///
    /// The coordinates must come from a section of the same dimensions
    /// the shape was built for; anything else is a caller bug.
    pub fn likeness(&self, lit: &[Coord]) -> f32 {
        match self {
            Shape::Empty { box_area, .. } => {
                debug_assert!(lit.len() as u32 <= *box_area);
                (*box_area - lit.len() as u32) as f32 / *box_area as f32
            }
            Shape::Filled { box_area, .. } => {
                debug_assert!(lit.len() as u32 <= *box_area);
                lit.len() as f32 / *box_area as f32
            }
            Shape::Polygon(polygon) => {
                debug_assert!(
                    lit.iter().all(|&(x, y)| {
                        x >= 1 && x <= polygon.width && y >= 1 && y <= polygon.height
                    }),
                    "lit coordinates outside {}x{} section",
                    polygon.width,
                    polygon.height,
                );
                let filled_within =
                    lit.iter().filter(|&&coord| polygon.contains(coord)).count() as u32;
                let filled_outside = lit.len() as u32 - filled_within;
                // Every lit-outside pixel occupies one of the grid points
                // outside the polygon, so this cannot underflow.
                let unfilled_outside = polygon.unfilled_area - filled_outside;
                let box_area = polygon.filled_area + polygon.unfilled_area;
                (filled_within + unfilled_outside) as f32 / box_area as f32
            }
        }
    }
}

/// Result of a catalog scan for one section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Choice {
    pub character: char,
    /// Number of shapes scored before the scan stopped. Surfaced in the
    /// converter's debug timing summary.
    pub evaluated: usize,
}

/// The full shape catalog for one section size.
///
/// Rebuilt whenever the section size changes; the polygon definitions
/// themselves are process-wide constants.
#[derive(Debug, Clone)]
pub struct ShapeCatalog {
    shapes: Vec<Shape>,
    section_width: u32,
    section_height: u32,
}

impl ShapeCatalog {
    pub fn new(section_width: u32, section_height: u32) -> Self {
        let box_area = section_width * section_height;
        let mut shapes = vec![
            Shape::Empty { character: EMPTY_CHARACTER, box_area },
            Shape::Filled { character: FILLED_CHARACTER, box_area },
        ];
        shapes.extend(POLYGON_DEFINITIONS.iter().map(|&(character, points)| {
            Shape::Polygon(PolygonShape::new(
                character,
                points,
                section_width,
                section_height,
            ))
        }));
        Self {
            shapes,
            section_width,
            section_height,
        }
    }

    pub fn section_width(&self) -> u32 {
        self.section_width
    }

    pub fn section_height(&self) -> u32 {
        self.section_height
    }

    /// Pick the character for a section.
    ///
    /// Scans the catalog in order and accepts the first shape whose
    /// likeness strictly exceeds `min_likeness`. If no shape clears the
    /// threshold, falls back to the highest-scoring shape, keeping the
    /// earliest one on ties.
    pub fn choose(&self, lit: &[Coord], min_likeness: f32) -> Choice {
        let mut best_character = EMPTY_CHARACTER;
        let mut best_likeness = f32::MIN;

        for (index, shape) in self.shapes.iter().enumerate() {
            let likeness = shape.likeness(lit);
            if likeness > min_likeness {
                return Choice {
                    character: shape.character(),
                    evaluated: index + 1,
                };
            }
            if likeness > best_likeness {
                best_likeness = likeness;
                best_character = shape.character();
            }
        }

        Choice {
            character: best_character,
            evaluated: self.shapes.len(),
        }
    }
}
