//! Record entry form
//!
//! Holds the raw text of every field while the user types and converts it to
//! a [`CareRecord`] on save.

use crate::models::{AttentionType, CareRecord, GuardianInfo};
use strum::IntoEnumIterator;
use thiserror::Error;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, strum::EnumIter, strum::Display)]
pub enum FormField {
    #[strum(to_string = "Número")]
    Number,
    #[strum(to_string = "Fecha")]
    Date,
    #[strum(to_string = "Tipo de atención")]
    AttentionType,
    #[strum(to_string = "Nombre del animal")]
    AnimalName,
    #[strum(to_string = "Especie")]
    Species,
    #[strum(to_string = "Sexo")]
    Sex,
    #[strum(to_string = "Edad")]
    Age,
    #[strum(to_string = "Tutor")]
    GuardianName,
    #[strum(to_string = "DNI")]
    NationalId,
    #[strum(to_string = "Teléfono")]
    Phone,
    #[strum(to_string = "Dirección")]
    Address,
    #[strum(to_string = "Barrio")]
    Neighborhood,
    #[strum(to_string = "Motivo")]
    Motive,
    #[strum(to_string = "Diagnóstico")]
    Diagnosis,
    #[strum(to_string = "Tratamiento")]
    Treatment,
    #[strum(to_string = "Derivación")]
    Referral,
    #[strum(to_string = "Observaciones")]
    Notes,
}

impl FormField {
    fn index(self) -> usize {
        self as usize
    }

    /// Fields only shown for primary-care records.
    pub fn is_primary_care_only(self) -> bool {
        matches!(
            self,
            FormField::Motive | FormField::Diagnosis | FormField::Treatment | FormField::Referral
        )
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("El número de registro debe ser un entero: {0:?}")]
    InvalidNumber(String),

    #[error("Tipo de atención inválido: {0:?}")]
    InvalidAttentionType(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordForm {
    values: Vec<String>,
    focus: FormField,
}

impl RecordForm {
    /// Blank form dated `today` (ISO).
    pub fn new(today: &str) -> Self {
        let mut form = Self {
            values: vec![String::new(); FormField::iter().count()],
            focus: FormField::Number,
        };
        form.reset(today);
        form
    }

    /// Clears every field, sets the date to `today` and the type to sterilization.
    pub fn reset(&mut self, today: &str) {
        for value in &mut self.values {
            value.clear();
        }
        self.set(FormField::Date, today);
        self.set(FormField::AttentionType, AttentionType::default().as_wire());
        self.focus = FormField::Number;
    }

    pub fn get(&self, field: FormField) -> &str {
        &self.values[field.index()]
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        self.values[field.index()] = value.into();
    }

    pub fn set_number(&mut self, number: u32) {
        self.set(FormField::Number, number.to_string());
    }

    /// Fills the form from a fetched record.
    pub fn load(&mut self, record: &CareRecord) {
        let opt = |value: &Option<String>| value.clone().unwrap_or_default();
        self.set(FormField::Number, record.record_number.to_string());
        self.set(FormField::Date, record.date.clone());
        self.set(FormField::AttentionType, record.attention_type.as_wire());
        self.set(FormField::AnimalName, record.animal_name.clone());
        self.set(FormField::Species, record.species.clone());
        self.set(FormField::Sex, record.sex.clone());
        self.set(FormField::Age, opt(&record.age));
        self.set(FormField::GuardianName, record.guardian.full_name.clone());
        self.set(FormField::NationalId, record.guardian.national_id.clone());
        self.set(FormField::Phone, opt(&record.guardian.phone));
        self.set(FormField::Address, opt(&record.guardian.address));
        self.set(FormField::Neighborhood, opt(&record.guardian.neighborhood));
        self.set(FormField::Motive, opt(&record.motive));
        self.set(FormField::Diagnosis, opt(&record.diagnosis));
        self.set(FormField::Treatment, opt(&record.treatment));
        self.set(FormField::Referral, opt(&record.referral));
        self.set(FormField::Notes, opt(&record.notes));
        self.focus = FormField::Number;
    }

    pub fn attention_type(&self) -> Option<AttentionType> {
        self.get(FormField::AttentionType).parse().ok()
    }

    /// Fields relevant to the selected attention type, in display order.
    pub fn visible_fields(&self) -> Vec<FormField> {
        let primary_care = self.attention_type() == Some(AttentionType::PrimaryCare);
        FormField::iter()
            .filter(|field| primary_care || !field.is_primary_care_only())
            .collect()
    }

    pub fn focus(&self) -> FormField {
        self.focus
    }

    pub fn focus_next(&mut self) {
        self.move_focus(1);
    }

    pub fn focus_prev(&mut self) {
        self.move_focus(-1);
    }

    fn move_focus(&mut self, step: isize) {
        let fields = self.visible_fields();
        let current = fields.iter().position(|f| *f == self.focus).unwrap_or(0) as isize;
        let len = fields.len() as isize;
        self.focus = fields[(current + step).rem_euclid(len) as usize];
    }

    pub fn input_char(&mut self, c: char) {
        self.values[self.focus.index()].push(c);
    }

    pub fn backspace(&mut self) {
        self.values[self.focus.index()].pop();
    }

    /// Flips the attention type between the two kinds.
    pub fn toggle_attention_type(&mut self) {
        let next = match self.attention_type() {
            Some(AttentionType::Sterilization) => AttentionType::PrimaryCare,
            _ => AttentionType::Sterilization,
        };
        self.set(FormField::AttentionType, next.as_wire());
    }

    pub fn to_record(&self) -> Result<CareRecord, FormError> {
        let raw_number = self.get(FormField::Number).trim();
        let record_number = raw_number
            .parse::<u32>()
            .map_err(|_| FormError::InvalidNumber(raw_number.to_string()))?;
        let raw_type = self.get(FormField::AttentionType);
        let attention_type = raw_type
            .parse::<AttentionType>()
            .map_err(|_| FormError::InvalidAttentionType(raw_type.to_string()))?;

        let text = |field| self.get(field).trim().to_string();
        let optional = |field| Some(text(field)).filter(|v| !v.is_empty());

        Ok(CareRecord {
            record_number,
            date: text(FormField::Date),
            attention_type,
            animal_name: text(FormField::AnimalName),
            species: text(FormField::Species),
            sex: text(FormField::Sex),
            age: optional(FormField::Age),
            guardian: GuardianInfo {
                full_name: text(FormField::GuardianName),
                national_id: text(FormField::NationalId),
                phone: optional(FormField::Phone),
                address: optional(FormField::Address),
                neighborhood: optional(FormField::Neighborhood),
            },
            motive: optional(FormField::Motive),
            diagnosis: optional(FormField::Diagnosis),
            treatment: optional(FormField::Treatment),
            referral: optional(FormField::Referral),
            notes: optional(FormField::Notes),
        })
    }
}
