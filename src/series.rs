use super::config::SmoothingPolicy;


/// Day-over-day increments; the first day keeps its cumulative value.
pub fn daily(data: &[f64]) -> Vec<f64> {
    (0..data.len()).map(
	|i| match i {
	    0 => data[0],
	    i => data[i] - data[i-1]
	}
    ).collect()
}


pub fn cumsum(data: &[f64]) -> Vec<f64> {
    let mut sum = 0.0;
    data.iter().map(
	|v| {sum += v; sum}
    ).collect()
}


/// Single left-to-right pass moving `policy.amount` of a spike into a
/// preceding low day. The updated day takes part in the next comparison.
pub fn smooth(data: &[f64], policy: &SmoothingPolicy) -> Vec<f64> {
    let mut result = data.to_vec();
    for i in 1..result.len() {
	if result[i-1] < policy.threshold && result[i] > policy.threshold {
	    let amount = result[i] * policy.amount;
	    result[i-1] += amount;
	    result[i] -= amount;
	}
    }
    result
}
