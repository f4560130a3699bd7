use super::config::KalmanParams;


/// Scalar recursive filter. The state is created from the first
/// measurement and lives for one run over a series.
#[derive(Clone,Debug)]
pub struct KalmanFilter {
    params: KalmanParams,
    state: Option<(f64,f64)>,
}

impl KalmanFilter {

    pub fn new(params: KalmanParams) -> Self {
	Self { params, state: None }
    }

    /// Feeds one measurement and returns the new estimate.
    pub fn filter(&mut self, measurement: f64) -> f64 {
	let KalmanParams { a, r, q } = self.params;
	let (x, cov) = match self.state {
	    None => (measurement, r),
	    Some((x, cov)) => {
		let x_pred = a * x;
		let cov_pred = a * a * cov + q;
		let gain = cov_pred / (cov_pred + r);
		(x_pred + gain * (measurement - x_pred),
		 cov_pred - gain * cov_pred)
	    }
	};
	self.state = Some((x, cov));
	x
    }

}
