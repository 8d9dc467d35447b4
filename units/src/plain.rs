/// Quantities which are simply type aliases for `f32` rather than having an
/// implementation as a `uom` `Quantity`.
///
/// These are the values that flow through the per-object hot loops (tree
/// branches, binning), where a plain `f32` is what gets stored on disk. The
/// aliases still give some clues in the source as to what they represent.
/// Transverse momenta, energies and masses are in GeV.

pub type Ptf32     = f32;
pub type Massf32   = f32;
pub type Etaf32    = f32; // pseudorapidity: dimensionless
pub type Phif32    = f32; // radians
pub type Weightf32 = f32;
