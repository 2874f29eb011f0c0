//! Field schemas for the three civil-registration record kinds.
//!
//! Every record of a kind carries exactly `FIELDS.len()` values, in the
//! order given here. The index constants are what selector lists and
//! viability checks refer to.

/// Birth registrations.
pub mod birth {
    pub const FORENAME: usize = 0;
    pub const SURNAME: usize = 1;
    pub const SEX: usize = 2;
    pub const BIRTH_DAY: usize = 3;
    pub const BIRTH_MONTH: usize = 4;
    pub const BIRTH_YEAR: usize = 5;
    pub const BIRTH_ADDRESS: usize = 6;
    pub const FATHER_FORENAME: usize = 7;
    pub const FATHER_SURNAME: usize = 8;
    pub const FATHER_OCCUPATION: usize = 9;
    pub const MOTHER_FORENAME: usize = 10;
    pub const MOTHER_MAIDEN_SURNAME: usize = 11;
    pub const MOTHER_OCCUPATION: usize = 12;
    pub const PARENTS_PLACE_OF_MARRIAGE: usize = 13;
    pub const PARENTS_DAY_OF_MARRIAGE: usize = 14;
    pub const PARENTS_MONTH_OF_MARRIAGE: usize = 15;
    pub const PARENTS_YEAR_OF_MARRIAGE: usize = 16;

    pub const FIELDS: &[&str] = &[
        "forename",
        "surname",
        "sex",
        "birth_day",
        "birth_month",
        "birth_year",
        "birth_address",
        "father_forename",
        "father_surname",
        "father_occupation",
        "mother_forename",
        "mother_maiden_surname",
        "mother_occupation",
        "parents_place_of_marriage",
        "parents_day_of_marriage",
        "parents_month_of_marriage",
        "parents_year_of_marriage",
    ];
}

/// Death registrations.
pub mod death {
    pub const FORENAME: usize = 0;
    pub const SURNAME: usize = 1;
    pub const SEX: usize = 2;
    pub const DEATH_DAY: usize = 3;
    pub const DEATH_MONTH: usize = 4;
    pub const DEATH_YEAR: usize = 5;
    pub const AGE_AT_DEATH: usize = 6;
    /// Recorded as `dd/mm/yyyy` when present.
    pub const DATE_OF_BIRTH: usize = 7;
    pub const PLACE_OF_DEATH: usize = 8;
    pub const OCCUPATION: usize = 9;
    pub const MARITAL_STATUS: usize = 10;
    pub const SPOUSE_NAMES: usize = 11;
    pub const FATHER_FORENAME: usize = 12;
    pub const FATHER_SURNAME: usize = 13;
    pub const MOTHER_FORENAME: usize = 14;
    pub const MOTHER_MAIDEN_SURNAME: usize = 15;

    pub const FIELDS: &[&str] = &[
        "forename",
        "surname",
        "sex",
        "death_day",
        "death_month",
        "death_year",
        "age_at_death",
        "date_of_birth",
        "place_of_death",
        "occupation",
        "marital_status",
        "spouse_names",
        "father_forename",
        "father_surname",
        "mother_forename",
        "mother_maiden_surname",
    ];
}

/// Marriage registrations.
pub mod marriage {
    pub const BRIDE_FORENAME: usize = 0;
    pub const BRIDE_SURNAME: usize = 1;
    pub const GROOM_FORENAME: usize = 2;
    pub const GROOM_SURNAME: usize = 3;
    pub const MARRIAGE_DAY: usize = 4;
    pub const MARRIAGE_MONTH: usize = 5;
    pub const MARRIAGE_YEAR: usize = 6;
    pub const PLACE_OF_MARRIAGE: usize = 7;
    pub const BRIDE_AGE_OR_DATE_OF_BIRTH: usize = 8;
    pub const GROOM_AGE_OR_DATE_OF_BIRTH: usize = 9;
    pub const BRIDE_FATHER_FORENAME: usize = 10;
    pub const BRIDE_FATHER_SURNAME: usize = 11;
    pub const BRIDE_MOTHER_FORENAME: usize = 12;
    pub const BRIDE_MOTHER_MAIDEN_SURNAME: usize = 13;
    pub const GROOM_FATHER_FORENAME: usize = 14;
    pub const GROOM_FATHER_SURNAME: usize = 15;
    pub const GROOM_MOTHER_FORENAME: usize = 16;
    pub const GROOM_MOTHER_MAIDEN_SURNAME: usize = 17;

    pub const FIELDS: &[&str] = &[
        "bride_forename",
        "bride_surname",
        "groom_forename",
        "groom_surname",
        "marriage_day",
        "marriage_month",
        "marriage_year",
        "place_of_marriage",
        "bride_age_or_date_of_birth",
        "groom_age_or_date_of_birth",
        "bride_father_forename",
        "bride_father_surname",
        "bride_mother_forename",
        "bride_mother_maiden_surname",
        "groom_father_forename",
        "groom_father_surname",
        "groom_mother_forename",
        "groom_mother_maiden_surname",
    ];
}
