//! Named dispatch over scalar, 2-D vector and 3-D vector transforms.

use super::ShTransform;
use crate::domain::ShtResult;
use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TransformKind {
    Scalar,
    Vector2D,
    Vector3D,
}

impl TransformKind {
    pub const ALL: [Self; 3] = [Self::Scalar, Self::Vector2D, Self::Vector3D];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Vector2D => "vector",
            Self::Vector3D => "vector3d",
        }
    }

    /// Number of spatial components of a field of this kind.
    pub const fn components(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vector2D => 2,
            Self::Vector3D => 3,
        }
    }
}

impl Display for TransformKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spectral side of a transform, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum SpectralFields {
    Scalar(Vec<Complex64>),
    Vector2D {
        spheroidal: Vec<Complex64>,
        toroidal: Vec<Complex64>,
    },
    Vector3D {
        radial: Vec<Complex64>,
        spheroidal: Vec<Complex64>,
        toroidal: Vec<Complex64>,
    },
}

impl SpectralFields {
    pub fn kind(&self) -> TransformKind {
        match self {
            Self::Scalar(_) => TransformKind::Scalar,
            Self::Vector2D { .. } => TransformKind::Vector2D,
            Self::Vector3D { .. } => TransformKind::Vector3D,
        }
    }

    /// Component arrays in `(Q, S, T)` order, skipping absent ones.
    pub fn components(&self) -> Vec<&[Complex64]> {
        match self {
            Self::Scalar(values) => vec![values.as_slice()],
            Self::Vector2D {
                spheroidal,
                toroidal,
            } => vec![spheroidal.as_slice(), toroidal.as_slice()],
            Self::Vector3D {
                radial,
                spheroidal,
                toroidal,
            } => vec![radial.as_slice(), spheroidal.as_slice(), toroidal.as_slice()],
        }
    }
}

/// Spatial side of a transform, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum SpatialFields {
    Scalar(Array2<f64>),
    Vector2D {
        v_theta: Array2<f64>,
        v_phi: Array2<f64>,
    },
    Vector3D {
        v_r: Array2<f64>,
        v_theta: Array2<f64>,
        v_phi: Array2<f64>,
    },
}

impl SpatialFields {
    pub fn kind(&self) -> TransformKind {
        match self {
            Self::Scalar(_) => TransformKind::Scalar,
            Self::Vector2D { .. } => TransformKind::Vector2D,
            Self::Vector3D { .. } => TransformKind::Vector3D,
        }
    }

    /// Component arrays in `(v_r, v_theta, v_phi)` order, skipping absent ones.
    pub fn components(&self) -> Vec<&Array2<f64>> {
        match self {
            Self::Scalar(values) => vec![values],
            Self::Vector2D { v_theta, v_phi } => vec![v_theta, v_phi],
            Self::Vector3D {
                v_r,
                v_theta,
                v_phi,
            } => vec![v_r, v_theta, v_phi],
        }
    }
}

impl ShTransform {
    /// Synthesis dispatched on the kind of `spectral`.
    pub fn synth(&self, spectral: &SpectralFields) -> ShtResult<SpatialFields> {
        match spectral {
            SpectralFields::Scalar(values) => Ok(SpatialFields::Scalar(self.synthesize(values)?)),
            SpectralFields::Vector2D {
                spheroidal,
                toroidal,
            } => {
                let (v_theta, v_phi) = self.synthesize_vector(spheroidal, toroidal)?;
                Ok(SpatialFields::Vector2D { v_theta, v_phi })
            }
            SpectralFields::Vector3D {
                radial,
                spheroidal,
                toroidal,
            } => {
                let (v_r, v_theta, v_phi) = self.synthesize_vector_3d(radial, spheroidal, toroidal)?;
                Ok(SpatialFields::Vector3D {
                    v_r,
                    v_theta,
                    v_phi,
                })
            }
        }
    }

    /// Analysis dispatched on the kind of `spatial`.
    pub fn analys(&self, spatial: &SpatialFields) -> ShtResult<SpectralFields> {
        match spatial {
            SpatialFields::Scalar(values) => Ok(SpectralFields::Scalar(self.analyze(values.view())?)),
            SpatialFields::Vector2D { v_theta, v_phi } => {
                let (spheroidal, toroidal) = self.analyze_vector(v_theta.view(), v_phi.view())?;
                Ok(SpectralFields::Vector2D {
                    spheroidal,
                    toroidal,
                })
            }
            SpatialFields::Vector3D {
                v_r,
                v_theta,
                v_phi,
            } => {
                let (radial, spheroidal, toroidal) =
                    self.analyze_vector_3d(v_r.view(), v_theta.view(), v_phi.view())?;
                Ok(SpectralFields::Vector3D {
                    radial,
                    spheroidal,
                    toroidal,
                })
            }
        }
    }

    /// Zeroed spectral fields of the given kind.
    pub fn spectral_fields(&self, kind: TransformKind) -> SpectralFields {
        match kind {
            TransformKind::Scalar => SpectralFields::Scalar(self.spec_array()),
            TransformKind::Vector2D => SpectralFields::Vector2D {
                spheroidal: self.spec_array(),
                toroidal: self.spec_array(),
            },
            TransformKind::Vector3D => SpectralFields::Vector3D {
                radial: self.spec_array(),
                spheroidal: self.spec_array(),
                toroidal: self.spec_array(),
            },
        }
    }
}
