/*!
Control the appearance of simulation result data

# Examples

Creating a [`ResultsTable`] after running a simulation group:

```
use rewrite_sim::prelude::*;

let sim = SimulationBuilder::new()
    .honest_miners(4)
    .attackers_iter([1, 3])
    .rounds(60)
    .repeat_all(3)
    .build()
    .unwrap();

let results = sim
    .run_all()
    .average(Average::Mean) // Take the mean of repeated simulations' results
    .all()
    .format(Format::CSV)    // Output results as CSV
    .build();

println!("{}", results);
```
*/

use std::{collections::BTreeSet, fmt::Display};

use crate::{simulation::SimulationOutput, utils::median_of_floats};

/// Floating point precision of results data.
pub const FLOAT_PRECISION_DIGITS: usize = 6;

/// Builder for [`ResultsTable`]. Produced by running a
/// [`SimulationGroup`](crate::simulation::SimulationGroup).
#[derive(Debug, Clone)]
pub struct ResultsBuilder {
    average: Average,
    columns: BTreeSet<Column>,
    data: Vec<SimulationOutput>,
    format: Format,
    repeated: usize,
}

/// Describes the appearance of a [`ResultsTable`] table as given by its
/// [`Display`] implementation.
#[derive(Debug, Clone, Copy, Default)]
pub enum Format {
    /// Comma-separated, without extra whitespace.
    CSV,
    /// Human-readable.
    #[default]
    PrettyPrint,
}

impl ResultsBuilder {
    pub(crate) fn new(data: Vec<SimulationOutput>, repeated: usize) -> Self {
        Self {
            data,
            repeated,
            average: Average::default(),
            columns: BTreeSet::default(),
            format: Format::default(),
        }
    }

    /// Include every optional column. [`ResultsBuilder::average`] must still
    /// be called separately to create averaged data.
    pub fn all(self) -> Self {
        self.attacker_share()
            .blocks_published()
            .longest_chain_length()
            .rounds()
            .target_erased()
    }

    /// Average the results of repeated simulations based on the given
    /// [`Average`] type. For types other than [`Average::None`], a column
    /// describing the averaging method will be included in the results table.
    pub fn average(mut self, average: Average) -> Self {
        self.average = average;

        self
    }

    /// Include the "Attacker Share" column: the fraction of the longest chain
    /// mined by attackers.
    pub fn attacker_share(mut self) -> Self {
        self.columns.insert(Column::AttackerShare);

        self
    }

    /// Include the "Blocks Published" column.
    pub fn blocks_published(mut self) -> Self {
        self.columns.insert(Column::BlocksPublished);

        self
    }

    /// Extract the raw [`SimulationOutput`] data from this [`ResultsBuilder`].
    ///
    /// # Ordering
    /// Outputs are grouped by attacker count, in the order the counts were
    /// given to the builder, with repeated runs next to each other.
    pub fn data(self) -> Vec<SimulationOutput> {
        self.data
    }

    /// Include the "Longest Chain Length" column.
    pub fn longest_chain_length(mut self) -> Self {
        self.columns.insert(Column::LongestChainLength);

        self
    }

    /// Include the "Simulated Rounds" column.
    pub fn rounds(mut self) -> Self {
        self.columns.insert(Column::Rounds);

        self
    }

    /// Include the "Target Erased" column. Averaged with [`Average::Mean`],
    /// it gives the attack's success rate.
    pub fn target_erased(mut self) -> Self {
        self.columns.insert(Column::TargetErased);

        self
    }

    /// Specify the [`Format`] of the results table.
    pub fn format(mut self, format: Format) -> Self {
        self.format = format;

        self
    }

    /// Create new [`ResultsTable`].
    pub fn build(self) -> ResultsTable {
        let ResultsBuilder { average, mut columns, data, format, repeated } =
            self;

        columns.insert(Column::HonestMiners);
        columns.insert(Column::Attackers);
        if average != Average::None {
            columns.insert(Column::AverageOf(average));
        }

        let columns = Vec::from_iter(columns);
        let rows = match average {
            Average::None => data
                .iter()
                .map(|output| {
                    columns.iter().map(|col| col.get_value(output)).collect()
                })
                .collect(),
            _ => data
                .chunks(repeated)
                .map(|outputs| {
                    columns
                        .iter()
                        .map(|col| col.get_average_value(average, outputs))
                        .collect()
                })
                .collect(),
        };

        ResultsTable { columns, format, rows }
    }
}

/// Formatted results from the completion of a
/// [`SimulationGroup`](crate::simulation::SimulationGroup). The results table
/// is given by the struct's [`Display`] implementation, as specified by
/// its [`Format`].
pub struct ResultsTable {
    columns: Vec<Column>,
    format: Format,
    rows: Vec<Vec<ColumnValue>>,
}

impl ResultsTable {
    const SEPARATOR_VERTICAL: char = '|';
    const SEPARATOR_HORIZONTAL: char = '-';

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn set_format(&mut self, format: Format) {
        self.format = format;
    }

    /// Number of data rows.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }
}

impl ResultsTable {
    /// Writes one line of cells, padded to `widths` when given, otherwise
    /// comma-separated.
    fn write_line(
        f: &mut std::fmt::Formatter<'_>,
        cells: &[String],
        widths: Option<&[usize]>,
    ) -> std::fmt::Result {
        match widths {
            None => write!(f, "{}", cells.join(",")),
            Some(widths) => cells.iter().zip(widths).try_for_each(|(c, &w)| {
                write!(f, " {:w$} {}", c, Self::SEPARATOR_VERTICAL)
            }),
        }
    }
}

impl Display for ResultsTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header: Vec<String> =
            self.columns.iter().map(|col| col.to_string()).collect();
        let body: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(|val| val.to_string()).collect())
            .collect();

        let widths: Option<Vec<usize>> = match self.format {
            Format::CSV => None,
            Format::PrettyPrint => Some(
                (0..header.len())
                    .map(|i| {
                        body.iter()
                            .map(|cells| cells[i].len())
                            .fold(header[i].len(), usize::max)
                    })
                    .collect(),
            ),
        };

        Self::write_line(f, &header, widths.as_deref())?;
        if let Some(widths) = &widths {
            let rule: usize = widths.iter().map(|w| w + 3).sum();
            write!(
                f,
                "\n{}",
                Self::SEPARATOR_HORIZONTAL.to_string().repeat(rule)
            )?;
        }

        for cells in &body {
            writeln!(f)?;
            Self::write_line(f, cells, widths.as_deref())?;
        }

        Ok(())
    }
}

/// Methods of extracting an average/central value from a set of repeated
/// simulations.
///
/// Only applied to the values of columns which differ between repeats.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Average {
    #[default]
    /// Include all repeated values.
    None,
    /// Arithmetic mean of all values.
    Mean,
    /// Median of all values.
    Median,
    /// Maximum of all values.
    Max,
    /// Minimum of all values.
    Min,
}

/// Type of column that can appear in a data table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Column {
    // Variant order determines the order of columns in results tables
    HonestMiners,
    Attackers,
    Rounds,
    AverageOf(Average),
    TargetErased,
    AttackerShare,
    BlocksPublished,
    LongestChainLength,
}

/// Value which corresponds to a [`Column`].
#[derive(Debug, Clone)]
enum ColumnValue {
    Count(usize),
    Float(f64),
}

impl Column {
    /// Per-run value of columns which differ between repeats.
    fn measure(&self, output: &SimulationOutput) -> Option<f64> {
        match &self {
            Self::TargetErased => {
                Some(if output.target_erased() { 1.0 } else { 0.0 })
            }
            Self::AttackerShare => Some(output.attacker_share()),
            Self::BlocksPublished => {
                Some(output.model.tree.num_blocks() as f64)
            }
            Self::LongestChainLength => {
                Some(output.model.longest_chain().len() as f64)
            }
            _ => None,
        }
    }

    fn get_value(&self, output: &SimulationOutput) -> ColumnValue {
        match &self {
            Self::HonestMiners => ColumnValue::Count(output.honest_miners),
            Self::Attackers => ColumnValue::Count(output.attackers),
            Self::Rounds => ColumnValue::Count(output.rounds),
            Self::AverageOf(_) => unreachable!(
                "never need the single value of the average descriptor column"
            ),
            _ => ColumnValue::Float(self.measure(output).unwrap_or_default()),
        }
    }

    fn get_average_value(
        &self,
        method: Average,
        data: &[SimulationOutput],
    ) -> ColumnValue {
        match &self {
            Self::AverageOf(_) => return ColumnValue::Count(data.len()),
            Self::HonestMiners | Self::Attackers | Self::Rounds => {
                return self.get_value(&data[0])
            }
            _ => (),
        }

        let vls: Vec<f64> =
            data.iter().filter_map(|output| self.measure(output)).collect();

        let avg = match method {
            Average::Mean => vls.iter().sum::<f64>() / vls.len() as f64,
            Average::Median => median_of_floats(vls),
            Average::Max => vls.into_iter().fold(f64::NEG_INFINITY, f64::max),
            Average::Min => vls.into_iter().fold(f64::INFINITY, f64::min),
            Average::None => unreachable!(),
        };

        ColumnValue::Float(avg)
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self {
            Self::AverageOf(method) => match method {
                Average::Mean => write!(f, "Mean Of"),
                Average::Median => write!(f, "Median Of"),
                Average::Max => write!(f, "Max Of"),
                Average::Min => write!(f, "Min Of"),
                Average::None => unreachable!(),
            },
            Self::HonestMiners => write!(f, "Honest Miners"),
            Self::Attackers => write!(f, "Attackers"),
            Self::Rounds => write!(f, "Simulated Rounds"),
            Self::TargetErased => write!(f, "Target Erased"),
            Self::AttackerShare => write!(f, "Attacker Share"),
            Self::BlocksPublished => write!(f, "Blocks Published"),
            Self::LongestChainLength => write!(f, "Longest Chain Length"),
        }
    }
}

impl Display for ColumnValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self {
            Self::Count(n) => write!(f, "{}", n),
            Self::Float(x) => write!(f, "{:.1$}", x, FLOAT_PRECISION_DIGITS),
        }
    }
}
