//! Unit tests for lm-batch.

#[cfg(test)]
pub(crate) mod helpers {
    use lm_core::{LinkId, Point};
    use lm_match::{LineStringLocation, Location, StartToEndLocation};
    use lm_network::{LinkSpec, RoadNetwork, RoadNetworkBuilder};

    use crate::{BatchObserver, BatchSummary};

    /// Bottom road 0–1–2 along y = 0 with a parallel road 60 m north,
    /// joined at both ends.
    pub fn ladder() -> RoadNetwork {
        let mut b = RoadNetworkBuilder::new();
        let n0 = b.add_node(Point::new(0.0, 0.0));
        let n1 = b.add_node(Point::new(100.0, 0.0));
        let n2 = b.add_node(Point::new(200.0, 0.0));
        let n3 = b.add_node(Point::new(0.0, 60.0));
        let n4 = b.add_node(Point::new(200.0, 60.0));
        b.add_link(LinkSpec::new(LinkId(1), n0, n1));
        b.add_link(LinkSpec::new(LinkId(2), n1, n2));
        b.add_link(LinkSpec::new(LinkId(3), n0, n3));
        b.add_link(LinkSpec::new(LinkId(4), n3, n4));
        b.add_link(LinkSpec::new(LinkId(5), n2, n4));
        b.build().unwrap()
    }

    pub fn east_line(id: &str) -> Location {
        Location::Line(LineStringLocation::new(
            id,
            vec![
                Point::new(10.0, 3.0),
                Point::new(50.0, -2.0),
                Point::new(90.0, 2.0),
                Point::new(130.0, -3.0),
                Point::new(170.0, 1.0),
                Point::new(190.0, 0.0),
            ],
        ))
    }

    pub fn far_line(id: &str) -> Location {
        Location::Line(LineStringLocation::new(
            id,
            vec![Point::new(0.0, 500.0), Point::new(100.0, 500.0), Point::new(200.0, 500.0)],
        ))
    }

    pub fn east_start_to_end(id: &str, length: f64) -> Location {
        Location::StartToEnd(StartToEndLocation::new(id, Point::new(10.0, 0.0), Point::new(190.0, 0.0), length))
    }

    /// Records every callback.
    #[derive(Default)]
    pub struct Recorder {
        pub progress: Vec<(usize, usize)>,
        pub end: Option<BatchSummary>,
    }

    impl BatchObserver for Recorder {
        fn on_progress(&mut self, processed: usize, matched: usize) {
            self.progress.push((processed, matched));
        }

        fn on_batch_end(&mut self, summary: &BatchSummary) {
            self.end = Some(*summary);
        }
    }
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use lm_match::MatchConfig;

    use crate::{BatchConfig, BatchError, BatchMatcher};

    #[test]
    fn default_is_valid() {
        assert!(BatchConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_progress_interval_is_rejected() {
        let cfg = BatchConfig { progress_interval: 0, ..BatchConfig::default() };
        assert!(matches!(cfg.validate(), Err(BatchError::Config(_))));
    }

    #[test]
    fn invalid_matcher_config_is_rejected() {
        let net = super::helpers::ladder();
        let cfg = BatchConfig {
            matching: MatchConfig { sigma: -1.0, ..MatchConfig::default() },
            ..BatchConfig::default()
        };
        assert!(matches!(BatchMatcher::new(&net, cfg), Err(BatchError::Match(_))));
    }
}

// ── Batch runs ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod batch {
    use lm_core::LinkId;
    use lm_match::MatchStatus;

    use super::helpers::{east_line, east_start_to_end, far_line, ladder, Recorder};
    use crate::{BatchConfig, BatchMatcher, NoopObserver};

    #[test]
    fn results_follow_input_order() {
        let net = ladder();
        let matcher = BatchMatcher::new(&net, BatchConfig::default()).unwrap();
        let locations = vec![east_line("a"), far_line("b"), east_start_to_end("c", 180.0), east_start_to_end("d", -1.0)];
        let results = matcher.run(&locations, &mut NoopObserver);

        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c", "d"]);
        let statuses: Vec<MatchStatus> = results.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            [MatchStatus::Match, MatchStatus::NoMatch, MatchStatus::Match, MatchStatus::InvalidInput]
        );
        assert_eq!(results[0].link_ids(), vec![LinkId(1), LinkId(2)]);
        assert_eq!(results[2].link_ids(), vec![LinkId(1), LinkId(2)]);
    }

    #[test]
    fn counters_match_results() {
        let net = ladder();
        let matcher = BatchMatcher::new(&net, BatchConfig::default()).unwrap();
        let locations = vec![east_line("a"), far_line("b"), east_start_to_end("c", 180.0)];
        let results = matcher.run(&locations, &mut NoopObserver);

        assert_eq!(matcher.processed(), results.len());
        assert_eq!(matcher.matched(), results.iter().filter(|r| r.is_match()).count());
        assert_eq!(matcher.matched(), 2);
    }

    #[test]
    fn counters_reset_between_runs() {
        let net = ladder();
        let matcher = BatchMatcher::new(&net, BatchConfig::default()).unwrap();
        matcher.run(&[east_line("a"), east_line("b")], &mut NoopObserver);
        matcher.run(&[far_line("c")], &mut NoopObserver);
        assert_eq!(matcher.processed(), 1);
        assert_eq!(matcher.matched(), 0);
    }

    #[test]
    fn progress_every_interval() {
        let net = ladder();
        let cfg = BatchConfig { progress_interval: 2, ..BatchConfig::default() };
        let matcher = BatchMatcher::new(&net, cfg).unwrap();
        let locations = vec![east_line("a"), far_line("b"), east_line("c"), far_line("d"), east_line("e")];

        let mut recorder = Recorder::default();
        matcher.run(&locations, &mut recorder);

        assert_eq!(recorder.progress, vec![(2, 1), (4, 2), (5, 3)]);
        let end = recorder.end.unwrap();
        assert_eq!(end.processed, 5);
        assert_eq!(end.matched, 3);
    }

    #[test]
    fn empty_batch() {
        let net = ladder();
        let matcher = BatchMatcher::new(&net, BatchConfig::default()).unwrap();
        let mut recorder = Recorder::default();
        assert!(matcher.run(&[], &mut recorder).is_empty());
        assert!(recorder.progress.is_empty());
        assert_eq!(recorder.end.map(|s| s.processed), Some(0));
    }
}

// ── CSV loader ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::Cursor;

    use lm_core::Point;
    use lm_match::{Location, ReliabilityMode};
    use lm_reach::Metric;

    use crate::{load_locations_csv, load_locations_reader, BatchError};

    const HEADER: &str = "id,kind,geometry,length,sigma,reliability,upstream,downstream\n";

    fn load(rows: &str) -> Result<Vec<Location>, BatchError> {
        load_locations_reader(Cursor::new(format!("{HEADER}{rows}")))
    }

    #[test]
    fn both_kinds() {
        let locations = load(
            "a,line,0 0;100 0; 200 5,,12.5,points,,distance:100\n\
             b,start_to_end,10 0;190 0,180,,,time:30,\n",
        )
        .unwrap();
        assert_eq!(locations.len(), 2);

        let Location::Line(line) = &locations[0] else { panic!("expected a line") };
        assert_eq!(line.id, "a");
        assert_eq!(line.geometry, vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0), Point::new(200.0, 5.0)]);
        assert_eq!(line.length, None);
        assert_eq!(line.sigma, Some(12.5));
        assert_eq!(line.reliability_mode, ReliabilityMode::PointObservations);
        assert!(line.upstream.is_none());
        let down = line.downstream.unwrap();
        assert_eq!((down.metric, down.bound), (Metric::Distance, 100.0));

        let Location::StartToEnd(s2e) = &locations[1] else { panic!("expected start_to_end") };
        assert_eq!(s2e.id, "b");
        assert_eq!(s2e.start, Point::new(10.0, 0.0));
        assert_eq!(s2e.end, Point::new(190.0, 0.0));
        assert_eq!(s2e.length, 180.0);
        let up = s2e.upstream.unwrap();
        assert_eq!((up.metric, up.bound), (Metric::Time, 30.0));
        assert!(s2e.downstream.is_none());
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let csv = "id,kind,geometry,length,upstream,downstream\nx,line,0 0;10 0,,,\n";
        let locations = load_locations_reader(Cursor::new(csv)).unwrap();
        let Location::Line(line) = &locations[0] else { panic!("expected a line") };
        assert_eq!(line.sigma, None);
        assert_eq!(line.reliability_mode, ReliabilityMode::Geometry);
    }

    #[test]
    fn implausible_values_still_load() {
        let locations = load("n,start_to_end,0 0;10 0,-5,,,,\n").unwrap();
        let Location::StartToEnd(s2e) = &locations[0] else { panic!("expected start_to_end") };
        assert_eq!(s2e.length, -5.0);
    }

    #[test]
    fn malformed_rows_name_the_location() {
        let cases = [
            "bad,circle,0 0;1 1,,,,,\n",
            "bad,line,0 0;1,,,,,\n",
            "bad,line,0 0;x 1,,,,,\n",
            "bad,line,0 0;1 1,,,sometimes,,\n",
            "bad,line,0 0;1 1,,,,distance,\n",
            "bad,line,0 0;1 1,,,,hops:3,\n",
            "bad,line,0 0;1 1,,,,,distance:far\n",
            "bad,start_to_end,0 0;1 1;2 2,10,,,,\n",
            "bad,start_to_end,0 0;1 1,,,,,\n",
        ];
        for rows in cases {
            match load(rows) {
                Err(BatchError::Parse { id, .. }) => assert_eq!(id, "bad", "{rows}"),
                other => panic!("{rows}: expected a parse error, got {other:?}"),
            }
        }
    }

    #[test]
    fn non_numeric_length_is_a_csv_error() {
        assert!(matches!(load("a,line,0 0;1 1,long,,,,\n"), Err(BatchError::Csv(_))));
    }

    #[test]
    fn from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locations.csv");
        std::fs::write(&path, format!("{HEADER}a,line,0 0;10 0,,,,,\n")).unwrap();
        assert_eq!(load_locations_csv(&path).unwrap().len(), 1);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_locations_csv(&dir.path().join("nope.csv"));
        assert!(matches!(result, Err(BatchError::Io(_))));
    }
}

// ── CSV writer ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod writer {
    use lm_core::LinkId;
    use lm_match::{LocationMatch, MatchStatus, MatchedLink};

    use crate::CsvResultWriter;

    fn matched() -> LocationMatch {
        let mut result = LocationMatch::empty("a", MatchStatus::Match);
        result.matched_links = vec![
            MatchedLink { link_id: LinkId(1), reversed: false, start_fraction: 0.25, end_fraction: 1.0 },
            MatchedLink { link_id: LinkId(7), reversed: true, start_fraction: 0.0, end_fraction: 0.5 },
        ];
        result.start_fraction = 0.25;
        result.end_fraction = 0.5;
        result.reliability = 90.5;
        result.path_length = 125.0;
        result.downstream_link_ids = Some(vec![LinkId(4), LinkId(5)]);
        result
    }

    #[test]
    fn rows_and_header() {
        let mut writer = CsvResultWriter::from_writer(Vec::new()).unwrap();
        writer.write_results(&[matched(), LocationMatch::empty("b", MatchStatus::NoPath)]).unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "id,status,links,start_fraction,end_fraction,reliability,path_length,upstream,downstream",
                "a,MATCH,1:0:0.25:1|7:1:0:0.5,0.25,0.5,90.5,125,,4|5",
                "b,NO_PATH,,0,0,0,0,,",
            ]
        );
    }

    #[test]
    fn finish_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let mut writer = CsvResultWriter::create(&path).unwrap();
        writer.write_result(&matched()).unwrap();
        writer.finish().unwrap();
        writer.finish().unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "a");
        assert_eq!(&rows[0][1], "MATCH");
    }
}

// ── Load, match, write ────────────────────────────────────────────────────────

#[cfg(test)]
mod end_to_end {
    use crate::{load_locations_csv, BatchConfig, BatchMatcher, CsvResultWriter, NoopObserver};

    #[test]
    fn csv_in_csv_out() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("locations.csv");
        let output = dir.path().join("results.csv");
        std::fs::write(
            &input,
            "id,kind,geometry,length,upstream,downstream\n\
             east,line,10 3;50 -2;90 2;130 -3;170 1;190 0,,,distance:100\n\
             far,line,0 500;100 500;200 500,,,\n\
             s2e,start_to_end,10 0;190 0,180,,\n",
        )
        .unwrap();

        let net = super::helpers::ladder();
        let locations = load_locations_csv(&input).unwrap();
        let matcher = BatchMatcher::new(&net, BatchConfig::default()).unwrap();
        let results = matcher.run(&locations, &mut NoopObserver);

        let mut writer = CsvResultWriter::create(&output).unwrap();
        writer.write_results(&results).unwrap();
        writer.finish().unwrap();

        let mut reader = csv::Reader::from_path(&output).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        let summary: Vec<(&str, &str)> = rows.iter().map(|r| (&r[0], &r[1])).collect();
        assert_eq!(summary, [("east", "MATCH"), ("far", "NO_MATCH"), ("s2e", "MATCH")]);
        assert_eq!(&rows[0][8], "4|5");
        assert_eq!(&rows[1][2], "");
    }
}
