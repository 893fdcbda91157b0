/*!

This is the long-form manual for `bracket_engine` and `bracketizer`.

## Brackets

A bracket is a single-elimination tournament. The entries of the first round
are given in order, and their number must be a power of two (2, 4, 8, ...).
Each round is made of questions: question 1 opposes the first and second
entries of the round, question 2 the third and fourth, and so on. The winners
of the questions of a round, in question order, are the entries of the next
round. The last round holds a single entry, the champion.

| entries | rounds (including the champion) |
|---------|---------------------------------|
| 2       | 2                               |
| 4       | 3                               |
| 8       | 4                               |
| 16      | 5                               |

## Resolution rules

Every ballot names a round, a question and an entry. For each question:

* ballots that do not name one of the two contestants of the question are ignored;
* if nobody voted, the question is undecided and the next round receives a
  placeholder (`__________`) instead of a contestant. The next rounds are still
  built on top of it;
* the contestant with the most votes goes to the next round, with a count of 0;
* on equal counts, the contestant whose name has the smallest SHA-256 digest
  (in hexadecimal) goes to the next round and keeps its count, which marks the
  tie.

The rules do not depend on the order of the ballots: resolving the same ballots
twice always gives the same bracket.

> Note: changing the tie-break function changes past results. Brackets with
> stored ballots must keep the function they were resolved with.
>
> Brackets resolved with an MD5 tie-break do not give the same results here.
> For example, a tie between `C` and `D` goes to `D` with SHA-256 and went to
> `C` with MD5. Such brackets must be resolved again and checked before their
> results are published.

## Guesses

When a round is current (`currentRound` of 1 or more), guesses for that round
are tallied against the contestants of that round as resolved from the votes.
Guesses for other rounds are ignored. Guesses never change the resolved
bracket.

## Input formats for `bracketizer`

Ballots are read from files declared in the configuration.

### `json`

```text
[
  {"username": "alice", "round": 1, "question": 1, "choice": "Raindrops on roses"},
  {"round": 1, "question": 2, "choice": "warm woolen mittens"}
]
```

### `csv`

```text
username,round,question,choice
alice,1,1,Raindrops on roses
,1,2,warm woolen mittens
```

The `username` is optional. When present, only one ballot per user, round and
question is kept, following the `duplicatePolicy` rule:

* `insertOnly` (default): the first ballot is kept, the others are rejected;
* `upsert`: the last ballot replaces the previous ones.

## Configuration

```text
{
  "bracket": {
    "name": "Favorite Things",
    "choices": ["Raindrops on roses", "whiskers on kittens"],
    "isOpen": true,
    "currentRound": 1,
    "startTime": "2023-03-01T00:00:00Z",
    "endTime": "2023-03-22T00:00:00Z"
  },
  "ballotSources": [
    {"provider": "json", "filePath": "votes.json"},
    {"provider": "csv", "filePath": "guesses.csv", "kind": "guess"}
  ],
  "rules": {"duplicatePolicy": "insertOnly"},
  "outputSettings": {"outputPath": "summary.json"}
}
```

`currentRound` set to 0 means that the whole bracket is open for voting at once.
A value of 1 or more means that only this round is open, for guesses.
The bracket cannot be displayed before `startTime`.

 */
