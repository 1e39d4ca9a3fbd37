use csv::Writer;

use crate::model::api::results::{ElectionResults, PositionResult};

/// Render results as a CSV report.
///
/// The report is a sequence of blocks separated by blank lines: an election
/// header block, then a summary block and a standings table per position.
/// Each block is written by its own CSV writer; a lone empty field would
/// otherwise be quoted, and a quoted empty field is not a blank line.
pub fn export_csv(results: &ElectionResults) -> Result<Vec<u8>, csv::Error> {
    let mut blocks = vec![election_block(results)?];
    for position in &results.positions {
        blocks.push(summary_block(position)?);
        blocks.push(table_block(position)?);
    }
    Ok(blocks.join(&b'\n'))
}

fn election_block(results: &ElectionResults) -> Result<Vec<u8>, csv::Error> {
    let mut buffer = Vec::new();
    {
        let mut writer = Writer::from_writer(&mut buffer);
        writer.write_record(["Election", &results.title])?;
        writer.write_record(["Total Votes", &results.total_votes.to_string()])?;
        writer.write_record(["Unique Voters", &results.unique_voters.to_string()])?;
        writer.flush()?;
    }
    Ok(buffer)
}

fn summary_block(position: &PositionResult) -> Result<Vec<u8>, csv::Error> {
    let mut buffer = Vec::new();
    {
        let mut writer = Writer::from_writer(&mut buffer);
        writer.write_record(["Position", &position.name])?;
        writer.write_record(["Total Votes", &position.total_votes.to_string()])?;
        writer.write_record(["Valid Votes", &position.valid_votes.to_string()])?;
        writer.write_record(["Abstentions", &position.abstentions.to_string()])?;
        writer.write_record(["Invalid Votes", &position.invalid_votes.to_string()])?;
        writer.flush()?;
    }
    Ok(buffer)
}

fn table_block(position: &PositionResult) -> Result<Vec<u8>, csv::Error> {
    let mut buffer = Vec::new();
    {
        let mut writer = Writer::from_writer(&mut buffer);
        writer.write_record(["Rank", "Candidate", "Votes", "Percentage"])?;
        for candidate in &position.candidates {
            // No rank when the position had no valid votes.
            let rank = candidate.rank.map(|rank| rank.to_string()).unwrap_or_default();
            writer.write_record([
                rank.as_str(),
                candidate.name.as_str(),
                &candidate.votes.to_string(),
                &format!("{:.1}", candidate.percentage),
            ])?;
        }
        writer.flush()?;
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use crate::model::{
        common::election::ElectionKind,
        db::{
            election::{Election, Position},
            vote::{BallotData, Vote},
        },
    };

    use super::super::{tally_election, tally_position};
    use super::*;

    fn spring_results() -> ElectionResults {
        let election = Election::published_example();
        let mut votes = Vec::new();
        // President: two for Amelia, one for Bashir, one abstention.
        votes.push(Vote::example(7, 1, BallotData::single(1)));
        votes.push(Vote::example(7, 1, BallotData::single(1)));
        votes.push(Vote::example(7, 1, BallotData::single(2)));
        votes.push(Vote::example(7, 1, BallotData::abstention()));
        // Welfare: Erin on both ballots, one each for Farid and Grace.
        votes.push(Vote::example(7, 2, BallotData::multiple([1, 2])));
        votes.push(Vote::example(7, 2, BallotData::multiple([1, 3])));
        // Social sec: one first preference for Ivan, one malformed ballot.
        votes.push(Vote::example(7, 3, BallotData::ranked([(1, 2), (2, 3)])));
        votes.push(Vote::example(7, 3, BallotData::single(1)));

        tally_election(&election, &votes)
    }

    #[test]
    fn reports_lay_out_as_blank_line_separated_blocks() {
        let bytes = export_csv(&spring_results()).unwrap();
        let report = String::from_utf8(bytes).unwrap();

        let expected = "\
Election,Students' Union Spring Elections
Total Votes,8
Unique Voters,8

Position,President
Total Votes,4
Valid Votes,3
Abstentions,1
Invalid Votes,0

Rank,Candidate,Votes,Percentage
1,Amelia Wright,2,66.7
2,Bashir Khan,1,33.3
3,Caitlin O'Shea,0,0.0

Position,Welfare Officers
Total Votes,2
Valid Votes,2
Abstentions,0
Invalid Votes,0

Rank,Candidate,Votes,Percentage
1,\"Erin Walsh, Jr.\",2,100.0
2,Farid Osman,1,50.0
2,Grace Liu,1,50.0

Position,Social Secretary
Total Votes,2
Valid Votes,1
Abstentions,0
Invalid Votes,1

Rank,Candidate,Votes,Percentage
1,Ivan Petrov,1,100.0
2,Hana Suzuki,0,0.0
2,Jess Flynn,0,0.0
";
        assert_eq!(report, expected);
    }

    #[test]
    fn reports_parse_back_with_a_csv_reader() {
        let results = spring_results();
        let bytes = export_csv(&results).unwrap();

        // Blank lines are skipped by the reader; widths vary per block.
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes.as_slice());
        let records = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(records[0], vec!["Election", results.title.as_str()]);
        assert_eq!(records[1], vec!["Total Votes", "8"]);

        // Candidate rows, in file order, carry the tallied numbers.
        let counts = records
            .iter()
            .filter(|record| record.len() == 4 && &record[0] != "Rank")
            .map(|record| {
                (
                    record[1].to_string(),
                    record[2].parse::<u64>().unwrap(),
                    record[3].parse::<f64>().unwrap(),
                )
            })
            .collect::<Vec<_>>();
        let tallied = results
            .positions
            .iter()
            .flat_map(|position| &position.candidates)
            .map(|candidate| (candidate.name.clone(), candidate.votes, candidate.percentage))
            .collect::<Vec<_>>();
        assert_eq!(counts, tallied);

        // Quoting survived: the comma in this name is data, not a separator.
        assert!(counts.iter().any(|(name, _, _)| name == "Erin Walsh, Jr."));
    }

    #[test]
    fn unranked_candidates_have_an_empty_rank_cell() {
        let results = ElectionResults {
            id: 3,
            title: "Quiet Election".to_string(),
            kind: ElectionKind::Single,
            total_votes: 0,
            unique_voters: 0,
            positions: vec![tally_position(&Position::president_example(), &[])],
        };

        let bytes = export_csv(&results).unwrap();
        let report = String::from_utf8(bytes).unwrap();
        assert!(report.contains("\n,Amelia Wright,0,0.0\n"));
    }
}
