//! Fixed timetable of the hill country railway. Every ordered pair of
//! distinct stations has at least one direct service.

use thiserror::Error;

use crate::models::train::{Station, TrainDeparture};

const SECOND_THIRD: &[&str] = &["2nd", "3rd"];
const ALL_CLASSES: &[&str] = &["1st", "2nd", "3rd"];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainError {
    #[error("Please select both departure and destination stations")]
    MissingStation,

    #[error("Unknown station: {0}")]
    UnknownStation(String),

    #[error("Departure and destination cannot be the same")]
    SameStation,

    #[error("Train {number} does not run from {from} to {to}")]
    TrainNotFound {
        number: String,
        from: Station,
        to: Station,
    },

    #[error("Class {0} is not available on this train")]
    ClassNotAvailable(String),
}

impl TrainError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TrainError::TrainNotFound { .. })
    }
}

const fn train(
    name: &'static str,
    number: &'static str,
    departs: &'static str,
    arrives: &'static str,
    duration: &'static str,
    classes: &'static [&'static str],
) -> TrainDeparture {
    TrainDeparture {
        name,
        number,
        departs,
        arrives,
        duration,
        classes,
        days: "Daily",
    }
}

const fn podi(number: &'static str, departs: &'static str, arrives: &'static str, duration: &'static str) -> TrainDeparture {
    train("Podi Menike", number, departs, arrives, duration, SECOND_THIRD)
}

const fn udarata(number: &'static str, departs: &'static str, arrives: &'static str, duration: &'static str) -> TrainDeparture {
    train("Udarata Menike", number, departs, arrives, duration, SECOND_THIRD)
}

use Station::*;

const TIMETABLE: &[(Station, Station, &[TrainDeparture])] = &[
    (Colombo, Kandy, &[
        podi("5", "05:55", "08:55", "3h 00m"),
        train("Intercity Express", "15", "07:00", "09:30", "2h 30m", ALL_CLASSES),
        udarata("7", "09:45", "13:00", "3h 15m"),
        train("Night Mail", "41", "21:00", "00:05", "3h 05m", SECOND_THIRD),
    ]),
    (Colombo, Ella, &[
        podi("5", "05:55", "14:40", "8h 45m"),
        udarata("7", "09:45", "18:15", "8h 30m"),
    ]),
    (Colombo, Hatton, &[
        podi("5", "05:55", "10:45", "4h 50m"),
        udarata("7", "09:45", "14:30", "4h 45m"),
    ]),
    (Colombo, Nanuoya, &[
        podi("5", "05:55", "12:30", "6h 35m"),
        udarata("7", "09:45", "16:15", "6h 30m"),
    ]),
    (Kandy, Colombo, &[
        train("Intercity Express", "16", "06:30", "09:00", "2h 30m", ALL_CLASSES),
        podi("6", "08:35", "11:35", "3h 00m"),
        udarata("8", "11:10", "14:30", "3h 20m"),
        train("Night Mail", "42", "18:00", "21:05", "3h 05m", SECOND_THIRD),
    ]),
    (Kandy, Ella, &[
        podi("5", "09:00", "14:40", "5h 40m"),
        udarata("7", "11:00", "16:45", "5h 45m"),
    ]),
    (Kandy, Hatton, &[
        podi("5", "09:00", "10:45", "1h 45m"),
        udarata("7", "11:00", "12:45", "1h 45m"),
    ]),
    (Kandy, Nanuoya, &[
        podi("5", "09:00", "12:20", "3h 20m"),
        udarata("7", "11:00", "14:15", "3h 15m"),
    ]),
    (Hatton, Colombo, &[
        podi("6", "06:30", "11:00", "4h 30m"),
        udarata("8", "09:15", "14:00", "4h 45m"),
    ]),
    (Hatton, Kandy, &[
        podi("6", "06:30", "08:15", "1h 45m"),
        udarata("8", "09:15", "11:00", "1h 45m"),
    ]),
    (Hatton, Ella, &[
        podi("5", "11:30", "14:00", "2h 30m"),
        udarata("7", "13:00", "15:30", "2h 30m"),
    ]),
    (Hatton, Nanuoya, &[
        podi("5", "11:30", "12:55", "1h 25m"),
        udarata("7", "13:00", "14:20", "1h 20m"),
    ]),
    (Nanuoya, Colombo, &[
        podi("6", "05:00", "11:35", "6h 35m"),
        udarata("8", "07:00", "13:30", "6h 30m"),
    ]),
    (Nanuoya, Kandy, &[
        podi("6", "05:00", "08:20", "3h 20m"),
        udarata("8", "07:00", "10:15", "3h 15m"),
    ]),
    (Nanuoya, Ella, &[
        podi("5", "13:30", "15:15", "1h 45m"),
        udarata("7", "15:00", "16:45", "1h 45m"),
    ]),
    (Nanuoya, Hatton, &[
        podi("6", "05:00", "06:25", "1h 25m"),
        udarata("8", "07:00", "08:20", "1h 20m"),
    ]),
    (Ella, Colombo, &[
        podi("6", "06:00", "14:45", "8h 45m"),
        udarata("8", "08:15", "16:45", "8h 30m"),
    ]),
    (Ella, Kandy, &[
        podi("6", "06:00", "11:40", "5h 40m"),
        udarata("8", "08:15", "14:00", "5h 45m"),
    ]),
    (Ella, Hatton, &[
        podi("6", "06:00", "08:30", "2h 30m"),
        udarata("8", "08:15", "10:45", "2h 30m"),
    ]),
    (Ella, Nanuoya, &[
        podi("6", "06:00", "07:45", "1h 45m"),
        udarata("8", "08:15", "10:00", "1h 45m"),
    ]),
];

/// Parses the two station names of a search or booking.
pub fn parse_route(from: Option<&str>, to: Option<&str>) -> Result<(Station, Station), TrainError> {
    let from = from.map(str::trim).filter(|s| !s.is_empty());
    let to = to.map(str::trim).filter(|s| !s.is_empty());
    let (Some(from), Some(to)) = (from, to) else {
        return Err(TrainError::MissingStation);
    };

    let from = Station::from_name(from).ok_or_else(|| TrainError::UnknownStation(from.to_string()))?;
    let to = Station::from_name(to).ok_or_else(|| TrainError::UnknownStation(to.to_string()))?;
    if from == to {
        return Err(TrainError::SameStation);
    }
    Ok((from, to))
}

/// Direct services from `from` to `to`, in departure order. Empty when the
/// pair has no direct train.
pub fn departures(from: Station, to: Station) -> &'static [TrainDeparture] {
    TIMETABLE
        .iter()
        .find(|(origin, destination, _)| *origin == from && *destination == to)
        .map(|(_, _, trains)| *trains)
        .unwrap_or(&[])
}

pub fn find_departure(
    from: Station,
    to: Station,
    number: &str,
) -> Result<&'static TrainDeparture, TrainError> {
    let number = number.trim();
    departures(from, to)
        .iter()
        .find(|train| train.number == number)
        .ok_or_else(|| TrainError::TrainNotFound {
            number: number.to_string(),
            from,
            to,
        })
}

/// The requested class, matched case-insensitively against the train's.
pub fn check_class(train: &TrainDeparture, class: Option<&str>) -> Result<Option<String>, TrainError> {
    let Some(class) = class.map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok(None);
    };
    train
        .classes
        .iter()
        .find(|offered| offered.eq_ignore_ascii_case(class))
        .map(|offered| Some(offered.to_string()))
        .ok_or_else(|| TrainError::ClassNotAvailable(class.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_pair_has_direct_trains() {
        for from in Station::ALL {
            for to in Station::ALL {
                if from != to {
                    assert!(!departures(from, to).is_empty(), "{} -> {}", from, to);
                }
            }
        }
        assert!(departures(Kandy, Kandy).is_empty());
    }

    #[test]
    fn test_colombo_to_kandy() {
        let trains = departures(Colombo, Kandy);
        assert_eq!(trains.len(), 4);
        assert_eq!(trains[1].name, "Intercity Express");
        assert_eq!(trains[1].classes, &["1st", "2nd", "3rd"]);
        assert_eq!(trains[3].arrives, "00:05");
    }

    #[test]
    fn test_parse_route() {
        assert_eq!(parse_route(Some("colombo"), Some(" Ella ")), Ok((Colombo, Ella)));
        assert_eq!(parse_route(Some("Kandy"), None), Err(TrainError::MissingStation));
        assert_eq!(parse_route(Some(""), Some("Kandy")), Err(TrainError::MissingStation));
        assert_eq!(parse_route(Some("Kandy"), Some("kandy")), Err(TrainError::SameStation));
        assert_eq!(
            parse_route(Some("Jaffna"), Some("Kandy")),
            Err(TrainError::UnknownStation("Jaffna".to_string()))
        );
    }

    #[test]
    fn test_find_departure_on_route() {
        let train = find_departure(Ella, Kandy, "6").unwrap();
        assert_eq!(train.departs, "06:00");

        let err = find_departure(Ella, Kandy, "15").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Train 15 does not run from Ella to Kandy");
    }

    #[test]
    fn test_check_class() {
        let intercity = find_departure(Colombo, Kandy, "15").unwrap();
        assert_eq!(check_class(intercity, Some("1ST")), Ok(Some("1st".to_string())));
        assert_eq!(check_class(intercity, None), Ok(None));

        let podi = find_departure(Colombo, Kandy, "5").unwrap();
        assert_eq!(
            check_class(podi, Some("1st")),
            Err(TrainError::ClassNotAvailable("1st".to_string()))
        );
    }
}
