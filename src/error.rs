//! Error taxonomy.
//!
//! `LoadError` and `ConfigurationError` abort the current pass and surface a
//! single message. `Unavailable` is not an error: it marks one chart or
//! section that has nothing to show, and the rest of the report carries on.

use std::fmt;

use thiserror::Error;

/// The file could not be turned into a dataset.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Неподдерживаемый формат файла: .{0}")]
    UnsupportedExtension(String),

    #[error("Ошибка загрузки файла: {0:#}")]
    Read(anyhow::Error),

    #[error("Файл не содержит данных")]
    Empty,

    #[error("Строка заголовков {row} вне диапазона (в файле {rows} строк)")]
    HeaderRowOutOfRange { row: usize, rows: usize },
}

/// The column mapping does not allow grouping by seller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Не выбрана колонка для '{0}'")]
    MissingColumn(&'static str),

    #[error("Колонка '{column}' для '{key}' отсутствует в данных")]
    UnknownColumn { key: &'static str, column: String },
}

/// Why a chart or comparison has nothing to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    /// Category or Revenue is not mapped.
    MissingColumns,
    /// No records belong to the seller.
    NoRecords,
    /// The mapped columns are not in the seller's data.
    ColumnsNotInData,
    /// Every value sums to zero.
    ZeroTotal,
    /// A pie cannot show negative values.
    NegativeValues,
    /// Nothing left after intersecting the selection with the metrics.
    EmptySelection,
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Unavailable::MissingColumns => "Данные для построения графика отсутствуют",
            Unavailable::NoRecords => "Нет данных для продавца",
            Unavailable::ColumnsNotInData => "Не хватает данных по категории или сумме продаж",
            Unavailable::ZeroTotal => "Нет данных для построения графика",
            Unavailable::NegativeValues => {
                "Круговая диаграмма не строится по отрицательным значениям"
            }
            Unavailable::EmptySelection => {
                "Нет данных для построения круговой диаграммы. Проверьте выбранные метрики и ИП"
            }
        };
        f.write_str(msg)
    }
}
