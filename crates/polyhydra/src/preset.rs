//! Preset files.
//!
//! A preset is the persisted form of a generator: shape, appearance flags and
//! the ordered operator chain, stored as pretty-printed JSON. Operator kinds
//! are written by name so files stay readable and hand-editable; an unknown
//! name is reported when the preset is applied, not when it is parsed.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::PRESET_FILE_PREFIX;
use crate::error::{ConfigError, PresetError};
use crate::generator::Polyhydra;
use crate::mesh::FaceSelection;
use crate::operators::{OperatorInstance, OperatorKind};
use crate::shapes::ShapeDescriptor;
use crate::types::ColorMethod;

/// One operator as stored in a preset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetOperator {
  pub op_type: String,
  pub face_selections: FaceSelection,
  pub amount: f32,
  pub randomize: bool,
  pub disabled: bool,
  pub animate: bool,
  pub animated_amount: f32,
  pub animation_rate: f32,
  pub animation_amount: f32,
}

impl Default for PresetOperator {
  fn default() -> Self {
    Self::from(&OperatorInstance::default())
  }
}

impl From<&OperatorInstance> for PresetOperator {
  fn from(op: &OperatorInstance) -> Self {
    Self {
      op_type: op.kind.name().to_string(),
      face_selections: op.face_selection,
      amount: op.amount,
      randomize: op.randomize,
      disabled: op.disabled,
      animate: op.animate,
      animated_amount: op.animated_amount,
      animation_rate: op.animation_rate,
      animation_amount: op.animation_amplitude,
    }
  }
}

impl PresetOperator {
  pub fn to_instance(&self) -> Result<OperatorInstance, ConfigError> {
    let kind: OperatorKind = self.op_type.parse()?;
    Ok(OperatorInstance {
      kind,
      face_selection: self.face_selections,
      amount: self.amount,
      randomize: self.randomize,
      disabled: self.disabled,
      animate: self.animate,
      animated_amount: self.animated_amount,
      animation_rate: self.animation_rate,
      animation_amplitude: self.animation_amount,
    })
  }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preset {
  pub name: String,
  pub shape: ShapeDescriptor,
  pub two_sided: bool,
  pub bypass_ops: bool,
  pub color_method: ColorMethod,
  pub appearance_preset_name: String,
  pub operators: Vec<PresetOperator>,
}

impl Preset {
  pub fn new(name: impl Into<String>, shape: ShapeDescriptor, operators: &[OperatorInstance]) -> Self {
    Self {
      name: name.into(),
      shape,
      operators: operators.iter().map(PresetOperator::from).collect(),
      ..Self::default()
    }
  }

  /// Capture a generator's current configuration.
  pub fn from_generator(name: impl Into<String>, generator: &Polyhydra) -> Self {
    Self {
      two_sided: generator.two_sided,
      bypass_ops: generator.bypass_ops,
      color_method: generator.color_method,
      appearance_preset_name: generator.appearance_preset_name.clone(),
      ..Self::new(name, generator.shape, generator.operators())
    }
  }

  /// The stored chain as instances. Fails on the first unknown operator name.
  pub fn operators(&self) -> Result<Vec<OperatorInstance>, ConfigError> {
    self.operators.iter().map(PresetOperator::to_instance).collect()
  }

  /// Overwrite the generator's configuration. On error the generator is
  /// left untouched.
  pub fn apply_to(&self, generator: &mut Polyhydra) -> Result<(), ConfigError> {
    let operators = self.operators()?;
    generator.shape = self.shape;
    generator.two_sided = self.two_sided;
    generator.bypass_ops = self.bypass_ops;
    generator.color_method = self.color_method;
    generator.appearance_preset_name = self.appearance_preset_name.clone();
    generator.set_operators(operators);
    Ok(())
  }

  pub fn to_json(&self) -> Result<String, PresetError> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  pub fn from_json(json: &str) -> Result<Self, PresetError> {
    Ok(serde_json::from_str(json)?)
  }

  /// File name this preset saves under.
  pub fn file_name(&self) -> String {
    format!("{PRESET_FILE_PREFIX}{}.json", self.name)
  }

  /// Write to `dir`, returning the file path.
  pub fn save(&self, dir: impl AsRef<Path>) -> Result<PathBuf, PresetError> {
    let path = dir.as_ref().join(self.file_name());
    std::fs::write(&path, self.to_json()?)?;
    Ok(path)
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self, PresetError> {
    let json = std::fs::read_to_string(path)?;
    Self::from_json(&json)
  }
}
