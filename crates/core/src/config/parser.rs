//! Line-oriented reader for the dynamic fuels parameter file
//!
//! The layout is a fixed sequence of `Name value` lines and tables whose
//! end is marked by the name that starts the next section. `>>` begins a
//! comment; blank lines are skipped. Values may be double-quoted to include
//! spaces.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::config::map_names::check_template_vars;
use crate::config::InputParameters;
use crate::core_types::{
    BaseFuelType, DisturbanceCatalog, DisturbanceType, FuelCoefficients, FuelType,
    FuelTypeCatalog, Multiplier, Species, SpeciesDataset,
};
use crate::error::{ConfigError, ParametersError};

/// Expected value of the `LandisData` line.
pub const LANDIS_DATA_VALUE: &str = "Dynamic Fuel System";

const HARDWOOD_LABEL: &str = "HardwoodMaximum";
const DEAD_FIR_LABEL: &str = "DeadFirMaxAge";
const FUEL_TYPES_LABEL: &str = "FuelTypes";
const DISTURBANCE_TABLE_LABEL: &str = "DisturbanceConversionTable";
const MAP_FILE_NAMES_LABEL: &str = "MapFileNames";
const PCT_CONIFER_LABEL: &str = "PctConiferFileName";
const PCT_DEAD_FIR_LABEL: &str = "PctDeadFirFileName";

/// A non-blank line split into words.
#[derive(Debug)]
struct Line {
    number: usize,
    words: Vec<String>,
}

/// Split a line into words, keeping double-quoted runs together.
fn split_words(text: &str, number: usize) -> Result<Vec<String>, ParametersError> {
    let mut words = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        let mut word = String::new();
        if c == '"' {
            chars.next();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '"' {
                    closed = true;
                    break;
                }
                word.push(c);
            }
            if !closed {
                return Err(ParametersError::syntax(number, "missing closing quote (\")"));
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                word.push(c);
                chars.next();
            }
        }
        words.push(word);
    }
    Ok(words)
}

/// Cursor over the meaningful lines of a parameter file.
struct LineReader {
    lines: Vec<Line>,
    pos: usize,
    last_line: usize,
}

impl LineReader {
    fn new(text: &str) -> Result<Self, ParametersError> {
        let mut lines = Vec::new();
        let mut last_line = 0;
        for (i, raw) in text.lines().enumerate() {
            let number = i + 1;
            last_line = number;
            let content = raw.find(">>").map_or(raw, |at| &raw[..at]);
            let words = split_words(content, number)?;
            if !words.is_empty() {
                lines.push(Line { number, words });
            }
        }
        Ok(Self {
            lines,
            pos: 0,
            last_line,
        })
    }

    fn at_end(&self) -> bool {
        self.pos >= self.lines.len()
    }

    fn current(&self) -> Option<&Line> {
        self.lines.get(self.pos)
    }

    fn current_name(&self) -> Option<&str> {
        self.current().map(|line| line.words[0].as_str())
    }

    /// Line number for errors; one past the last line once input is exhausted.
    fn line_number(&self) -> usize {
        self.current().map_or(self.last_line + 1, |line| line.number)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    /// Read `name value` and return `(line, value)`.
    fn read_var(&mut self, name: &str) -> Result<(usize, String), ParametersError> {
        let number = self.line_number();
        let line = self
            .current()
            .ok_or_else(|| ParametersError::syntax(number, format!("Expected \"{name}\"")))?;
        if line.words[0] != name {
            return Err(ParametersError::syntax(
                number,
                format!("Expected \"{name}\" but found \"{}\"", line.words[0]),
            ));
        }
        let value = match line.words.as_slice() {
            [_, value] => value.clone(),
            [_, _, extra, ..] => {
                return Err(ParametersError::syntax(
                    number,
                    format!("Extra data \"{extra}\" after the {name} parameter"),
                ))
            }
            _ => {
                return Err(ParametersError::syntax(
                    number,
                    format!("Missing value for {name}"),
                ))
            }
        };
        self.advance();
        Ok((number, value))
    }

    /// Read a line holding only `name`.
    fn read_name(&mut self, name: &str) -> Result<(), ParametersError> {
        let number = self.line_number();
        let found = match self.current() {
            Some(line) if line.words.len() == 1 && line.words[0] == name => None,
            Some(line) => Some(line.words.join(" ")),
            None => {
                return Err(ParametersError::syntax(
                    number,
                    format!("Expected the name \"{name}\""),
                ))
            }
        };
        if let Some(found) = found {
            return Err(ParametersError::syntax(
                number,
                format!("Expected the name \"{name}\" but found \"{found}\""),
            ));
        }
        self.advance();
        Ok(())
    }
}

fn parse_int(word: &str, field: &str, line: usize) -> Result<i32, ParametersError> {
    word.parse().map_err(|_| {
        ParametersError::syntax(line, format!("{field}: \"{word}\" is not a valid integer"))
    })
}

fn parse_real(word: &str, field: &str, line: usize) -> Result<f64, ParametersError> {
    word.parse().map_err(|_| {
        ParametersError::syntax(line, format!("{field}: \"{word}\" is not a valid number"))
    })
}

fn invalid(line: usize) -> impl FnOnce(ConfigError) -> ParametersError {
    move |source| ParametersError::Invalid { line, source }
}

fn lookup_species<'a>(
    species: &'a SpeciesDataset,
    name: &str,
    line: usize,
) -> Result<&'a Species, ParametersError> {
    species.get(name).ok_or_else(|| ParametersError::Invalid {
        line,
        source: ConfigError::UnknownSpecies {
            name: name.to_string(),
        },
    })
}

fn check_range(
    field: &'static str,
    value: i32,
    min: i32,
    max: i32,
    line: usize,
) -> Result<i32, ParametersError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ParametersError::Invalid {
            line,
            source: ConfigError::OutOfRange {
                field,
                value,
                min,
                max,
            },
        })
    }
}

fn read_template(reader: &mut LineReader, name: &str) -> Result<String, ParametersError> {
    let (line, template) = reader.read_var(name)?;
    check_template_vars(&template).map_err(invalid(line))?;
    Ok(template)
}

/// Parse a complete parameter file against a species catalog.
pub(crate) fn parse_parameters(
    text: &str,
    species: &SpeciesDataset,
) -> Result<InputParameters, ParametersError> {
    let mut reader = LineReader::new(text)?;

    let (line, landis_data) = reader.read_var("LandisData")?;
    if landis_data != LANDIS_DATA_VALUE {
        return Err(ParametersError::syntax(
            line,
            format!("The value \"{landis_data}\" is not \"{LANDIS_DATA_VALUE}\""),
        ));
    }

    let (line, timestep) = reader.read_var("Timestep")?;
    let timestep = parse_int(&timestep, "Timestep", line)?;
    let timestep = u32::try_from(timestep).map_err(|_| ParametersError::Invalid {
        line,
        source: ConfigError::NegativeTimestep { value: timestep },
    })?;

    // Species fuel coefficients, until HardwoodMaximum
    let mut coefficients = FuelCoefficients::new(species.len());
    let mut species_lines: FxHashMap<String, usize> = FxHashMap::default();
    while !reader.at_end() && reader.current_name() != Some(HARDWOOD_LABEL) {
        let number = reader.line_number();
        let words = &reader.lines[reader.pos].words;

        let sp = lookup_species(species, &words[0], number)?;
        if let Some(&first_line) = species_lines.get(&sp.name) {
            return Err(ParametersError::Invalid {
                line: number,
                source: ConfigError::DuplicateSpecies {
                    name: sp.name.clone(),
                    first_line,
                },
            });
        }
        species_lines.insert(sp.name.clone(), number);

        let value = words
            .get(1)
            .ok_or_else(|| ParametersError::syntax(number, "Expected the Fuel Coefficient"))?;
        let value = parse_real(value, "Fuel Coefficient", number)?;
        coefficients.set(sp, value).map_err(invalid(number))?;

        if let Some(extra) = words.get(2) {
            return Err(ParametersError::syntax(
                number,
                format!("Extra data \"{extra}\" after the Fuel Coefficient column"),
            ));
        }
        reader.advance();
    }

    let (line, hardwood_max) = reader.read_var(HARDWOOD_LABEL)?;
    let hardwood_max = parse_int(&hardwood_max, HARDWOOD_LABEL, line)?;
    let hardwood_max = check_range(HARDWOOD_LABEL, hardwood_max, 0, 100, line)?;

    let (line, dead_fir_max_age) = reader.read_var(DEAD_FIR_LABEL)?;
    let dead_fir_max_age = parse_int(&dead_fir_max_age, DEAD_FIR_LABEL, line)?;
    let dead_fir_max_age = check_range(DEAD_FIR_LABEL, dead_fir_max_age, 0, 100, line)?;

    debug!("Reading in the Fuel Assignment table...");
    reader.read_name(FUEL_TYPES_LABEL)?;
    let mut fuel_types = FuelTypeCatalog::builder();
    while !reader.at_end() && reader.current_name() != Some(DISTURBANCE_TABLE_LABEL) {
        let number = reader.line_number();
        let fuel_type = parse_fuel_type_row(&reader.lines[reader.pos].words, species, number)?;
        fuel_types.add(fuel_type, number).map_err(invalid(number))?;
        reader.advance();
    }

    debug!("Reading in the Disturbance Conversion table...");
    reader.read_name(DISTURBANCE_TABLE_LABEL)?;
    let mut rules = Vec::new();
    while !reader.at_end() && reader.current_name() != Some(MAP_FILE_NAMES_LABEL) {
        let number = reader.line_number();
        let words = &reader.lines[reader.pos].words;

        let fuel_index = parse_int(&words[0], "Fuel Index", number)?;
        let max_age = words
            .get(1)
            .ok_or_else(|| ParametersError::syntax(number, "Expected the Max Age"))?;
        let max_age = parse_int(max_age, "Max Age", number)?;
        let labels = words[2..].iter().cloned();
        rules.push(DisturbanceType::new(fuel_index, max_age, labels).map_err(invalid(number))?);
        reader.advance();
    }

    debug!("Reading in map names...");
    let map_file_names = read_template(&mut reader, MAP_FILE_NAMES_LABEL)?;
    let pct_conifer_file_name = read_template(&mut reader, PCT_CONIFER_LABEL)?;
    let pct_dead_fir_file_name = read_template(&mut reader, PCT_DEAD_FIR_LABEL)?;

    if let Some(line) = reader.current() {
        return Err(ParametersError::syntax(
            line.number,
            format!("Extra data \"{}\" after the {PCT_DEAD_FIR_LABEL} parameter", line.words[0]),
        ));
    }

    Ok(InputParameters {
        timestep,
        hardwood_max: hardwood_max as u8,
        dead_fir_max_age: dead_fir_max_age as u32,
        coefficients,
        fuel_types: fuel_types.build(),
        disturbances: DisturbanceCatalog::new(rules),
        map_file_names,
        pct_conifer_file_name,
        pct_dead_fir_file_name,
    })
}

/// `<index> <BaseFuel> <min> to <max> <species> [-<species> ...]`
fn parse_fuel_type_row(
    words: &[String],
    species: &SpeciesDataset,
    number: usize,
) -> Result<FuelType, ParametersError> {
    let mut words = words.iter();
    let mut next = |field: &str| {
        words
            .next()
            .ok_or_else(|| ParametersError::syntax(number, format!("Expected the {field}")))
    };

    let fuel_index = parse_int(next("Fuel Index")?, "Fuel Index", number)?;
    let base_fuel: BaseFuelType = next("Base Fuel Type")?.parse().map_err(invalid(number))?;
    let min_age_word = next("Min Age")?;
    let min_age = parse_int(min_age_word, "Min Age", number)?;

    match words.next() {
        Some(word) if word == "to" => {}
        found => {
            let mut message = format!("Expected \"to\" after the minimum age ({min_age_word})");
            if let Some(word) = found {
                message.push_str(&format!(", but found \"{word}\" instead"));
            }
            return Err(ParametersError::syntax(number, message));
        }
    }

    let max_age_word = words
        .next()
        .ok_or_else(|| ParametersError::syntax(number, "Expected the Max Age"))?;
    let max_age = parse_int(max_age_word, "Max Age", number)?;

    let mut seen: Vec<&str> = Vec::new();
    let mut multipliers = Vec::new();
    for word in words {
        let (name, multiplier) = match word.strip_prefix('-') {
            Some("") => return Err(invalid(number)(ConfigError::MissingSpeciesAfterMinus)),
            Some(name) => (name, Multiplier::Negative),
            None => (word.as_str(), Multiplier::Positive),
        };
        let sp = lookup_species(species, name, number)?;
        if seen.contains(&sp.name.as_str()) {
            return Err(invalid(number)(ConfigError::RepeatedFuelTypeSpecies {
                name: sp.name.clone(),
            }));
        }
        seen.push(&sp.name);
        multipliers.push((sp.index, multiplier));
    }
    if multipliers.is_empty() {
        return Err(invalid(number)(ConfigError::EmptySpeciesList));
    }

    FuelType::new(fuel_index, base_fuel, min_age, max_age, multipliers).map_err(invalid(number))
}
