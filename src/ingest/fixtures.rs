//! Representative upstream payloads, trimmed from real responses.

/// NOAA CO-OPS `product=water_level` for Sewells Point, last hour.
pub const NOAA_WATER_LEVEL: &str = r#"{
  "metadata": {"id": "8638610", "name": "Sewells Point", "lat": "36.9467", "lon": "-76.3300"},
  "data": [
    {"t": "2024-10-03 13:06", "v": "3.912", "s": "0.033", "f": "0,0,0,0", "q": "p"},
    {"t": "2024-10-03 13:12", "v": "3.987", "s": "0.030", "f": "0,0,0,0", "q": "p"},
    {"t": "2024-10-03 13:18", "v": "4.051", "s": "0.029", "f": "0,0,0,0", "q": "p"}
  ]
}"#;

/// Latest sample missing its value, as happens mid-update.
pub const NOAA_WATER_LEVEL_TRAILING_BLANK: &str = r#"{
  "metadata": {"id": "8638610", "name": "Sewells Point", "lat": "36.9467", "lon": "-76.3300"},
  "data": [
    {"t": "2024-10-03 13:12", "v": "3.987", "s": "0.030", "f": "0,0,0,0", "q": "p"},
    {"t": "2024-10-03 13:18", "v": "", "s": "", "f": "0,0,0,0", "q": ""}
  ]
}"#;

pub const NOAA_ERROR: &str = r#"{
  "error": {"message": "No data was found. This product may not be offered at this station at the requested time."}
}"#;

/// NOAA `product=predictions`, hourly. Deliberately out of order.
pub const NOAA_PREDICTIONS: &str = r#"{
  "predictions": [
    {"t": "2024-10-03 14:00", "v": "2.714"},
    {"t": "2024-10-03 15:00", "v": "2.301"},
    {"t": "2024-10-03 13:00", "v": "2.948"}
  ]
}"#;

/// NWS gridpoint forecast for AKQ/89,76 with seven periods.
pub const NWS_FORECAST: &str = r#"{
  "properties": {
    "periods": [
      {"number": 1, "name": "This Afternoon", "temperature": 68, "temperatureUnit": "F",
       "windSpeed": "10 to 15 mph", "windDirection": "NE",
       "shortForecast": "Chance Rain Showers", "detailedForecast": "A chance of rain showers.",
       "probabilityOfPrecipitation": {"unitCode": "wmoUnit:percent", "value": 40}},
      {"number": 2, "name": "Tonight", "temperature": 61, "temperatureUnit": "F",
       "windSpeed": "20 to 25 mph", "windDirection": "ENE",
       "shortForecast": "Rain", "detailedForecast": "Rain. Low around 61.",
       "probabilityOfPrecipitation": {"unitCode": "wmoUnit:percent", "value": 90}},
      {"number": 3, "name": "Friday", "temperature": 66, "temperatureUnit": "F",
       "windSpeed": "25 mph", "windDirection": "NE",
       "shortForecast": "Rain Likely", "detailedForecast": "Rain likely.",
       "probabilityOfPrecipitation": {"unitCode": "wmoUnit:percent", "value": 70}},
      {"number": 4, "name": "Friday Night", "temperature": 60, "temperatureUnit": "F",
       "windSpeed": "15 mph", "windDirection": "N",
       "shortForecast": "Chance Rain", "detailedForecast": "A chance of rain.",
       "probabilityOfPrecipitation": {"unitCode": "wmoUnit:percent", "value": 30}},
      {"number": 5, "name": "Saturday", "temperature": 70, "temperatureUnit": "F",
       "windSpeed": "5 to 10 mph", "windDirection": "W",
       "shortForecast": "Sunny", "detailedForecast": "Sunny.",
       "probabilityOfPrecipitation": {"unitCode": "wmoUnit:percent", "value": null}},
      {"number": 6, "name": "Saturday Night", "temperature": 58, "temperatureUnit": "F",
       "windSpeed": "5 mph", "windDirection": "SW",
       "shortForecast": "Clear", "detailedForecast": "Clear.",
       "probabilityOfPrecipitation": {"unitCode": "wmoUnit:percent", "value": null}},
      {"number": 7, "name": "Sunday", "temperature": 73, "temperatureUnit": "F",
       "windSpeed": "40 mph", "windDirection": "E",
       "shortForecast": "Windy", "detailedForecast": "Windy.",
       "probabilityOfPrecipitation": {"unitCode": "wmoUnit:percent", "value": 95}}
    ]
  }
}"#;

pub const NWS_NO_PERIODS: &str = r#"{"properties": {"periods": []}}"#;

/// USGS EPQS point query; `value` arrives as a string.
pub const EPQS_STRING_VALUE: &str = r#"{
  "location": {"x": -76.296, "y": 36.8695, "spatialReference": {"wkid": 4326, "latestWkid": 4326}},
  "locationId": 0,
  "value": "6.84",
  "rasterId": 60236,
  "resolution": 1
}"#;

pub const EPQS_NUMERIC_VALUE: &str = r#"{"locationId": 0, "value": -1.2, "resolution": 1}"#;

/// EPQS answer for points with no coverage.
pub const EPQS_NO_DATA: &str = r#"{"locationId": 0, "value": -1000000, "resolution": 1}"#;
